//! photolab: interactive photosynthesis lab on the terminal
//!
//! Walks a learner through the primary reaction, electron transport,
//! photophosphorylation, the Calvin cycle and the C3/C4/CAM comparison,
//! with an optional AI tutor answering questions in context.

mod command;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use chloroplast::screens::{ExcitationStage, PathwayProfile};
use chloroplast::{PoolSnapshot, Refusal, ScreenId, ViewComposer};
use tutor::bridge::NOT_CONFIGURED_MESSAGE;
use tutor::{MessageRole, Provider, TutorBridge, TutorSession};

use command::{Command, HELP};
use config::Config;

#[derive(Parser)]
#[command(name = "photolab")]
#[command(about = "Interactive photosynthesis lab with an AI tutor")]
struct Args {
    /// YAML file with `lab` and `tutor` sections
    #[arg(short, long, env = "PHOTOLAB_CONFIG")]
    config: Option<PathBuf>,

    /// Tutor credential
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Tutor model (overrides config file)
    #[arg(long, env = "TUTOR_MODEL")]
    model: Option<String>,

    /// Tutor provider: gemini or openai (overrides config file)
    #[arg(long, env = "TUTOR_PROVIDER")]
    provider: Option<Provider>,

    /// Tutor endpoint (overrides config file)
    #[arg(long, env = "TUTOR_BASE_URL")]
    base_url: Option<String>,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.tutor.model = model;
    }
    if let Some(provider) = args.provider {
        config.tutor.provider = provider;
    }
    if let Some(base_url) = args.base_url {
        config.tutor.base_url = Some(base_url);
    }
    config.tutor.api_key = args.api_key;

    let bridge = TutorBridge::from_config(&config.tutor)?;
    let session = Arc::new(TutorSession::new(Arc::new(bridge)));
    let mut lab = ViewComposer::new(config.lab);
    info!(session_id = %session.id(), "Lab opened");

    spawn_pool_watcher(lab.watch_totals());

    println!("Photosynthesis lab. Type `help` for commands.");
    if !session.is_configured() {
        println!("Note: {}", NOT_CONFIGURED_MESSAGE);
    }
    describe(&lab).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => run(command, &mut lab, &session).await,
            Err(e) => println!("  {}", e),
        }
    }

    info!("Lab closed");
    Ok(())
}

/// Print the header totals whenever a pool changes.
fn spawn_pool_watcher(mut totals: watch::Receiver<PoolSnapshot>) {
    tokio::spawn(async move {
        while totals.changed().await.is_ok() {
            let snapshot = *totals.borrow_and_update();
            println!("  [pools] {}", snapshot);
        }
        debug!("Pool watcher stopped");
    });
}

async fn run(command: Command, lab: &mut ViewComposer, session: &Arc<TutorSession>) {
    match command {
        Command::Screen(id) => {
            lab.select(id);
            describe(lab).await;
        }
        Command::Pools => {
            println!("  {}", lab.totals().await);
            if let Some(light) = lab.light() {
                println!("  H+ in lumen: {}", light.protons().await);
            }
        }
        Command::Fire => {
            let Some(light) = lab.light() else {
                return wrong_screen(ScreenId::LightReactions);
            };
            match light.fire_photon() {
                Ok(run) => {
                    println!("  Photon absorbed at PSII; electron on its way.");
                    tokio::spawn(async move {
                        run.wait().await;
                        println!("  Electron reached FNR: NADP+ reduced to NADPH.");
                    });
                }
                Err(refusal) => refused(&refusal),
            }
        }
        Command::Synthesize => {
            let Some(light) = lab.light() else {
                return wrong_screen(ScreenId::LightReactions);
            };
            match light.synthesize_atp().await {
                Ok(_) => {
                    if let Some(notice) = light.feedback() {
                        println!("  {}", notice);
                    }
                    println!("  H+ in lumen: {}", light.protons().await);
                }
                Err(refusal) => refused(&refusal),
            }
        }
        Command::Fix | Command::Reduce | Command::Regenerate => {
            let Some(calvin) = lab.calvin() else {
                return wrong_screen(ScreenId::CalvinCycle);
            };
            let result = match command {
                Command::Fix => calvin.fixate().await,
                Command::Reduce => calvin.reduce().await,
                _ => calvin.regenerate().await,
            };
            match result {
                Ok(stage) => {
                    if let Some(notice) = calvin.feedback() {
                        println!("  {}", notice);
                    }
                    println!("  Stage: {}", stage);
                    if let Some(warning) = calvin.warning().await {
                        println!("  Warning: {:?}", warning);
                    }
                }
                Err(refusal) => refused(&refusal),
            }
        }
        Command::Next | Command::Prev | Command::Reset => {
            let Some(walkthrough) = lab.overview_mut() else {
                return wrong_screen(ScreenId::Overview);
            };
            let stage = match command {
                Command::Next => walkthrough.next(),
                Command::Prev => walkthrough.previous(),
                _ => walkthrough.reset(),
            };
            println!("  {}", excitation_text(stage));
        }
        Command::Pathway(pathway) => {
            let Some(comparison) = lab.comparison_mut() else {
                return wrong_screen(ScreenId::Comparison);
            };
            let profile = comparison.select(pathway);
            println!("  {}: {}", pathway, profile_text(&profile));
        }
        Command::Chat => {
            if lab.toggle_chat() {
                for message in session.messages().await {
                    let speaker = match message.role {
                        MessageRole::User => "you",
                        MessageRole::Assistant => "tutor",
                    };
                    println!("{}> {}", speaker, message.content);
                }
                if !session.is_configured() {
                    println!("Note: {}", NOT_CONFIGURED_MESSAGE);
                }
            } else {
                println!("  Tutor hidden.");
            }
        }
        Command::Ask(question) => {
            if !lab.is_chat_visible() {
                lab.toggle_chat();
            }
            if session.is_loading() {
                println!("  The tutor is still thinking.");
                return;
            }
            let context = lab.tutor_context();
            let session = Arc::clone(session);
            tokio::spawn(async move {
                match session.send(&question, &context).await {
                    Ok(answer) => println!("tutor> {}", answer),
                    Err(e) => println!("  {}", e),
                }
            });
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

async fn describe(lab: &ViewComposer) {
    let id = lab.active();
    println!("== {} ==", id.title());
    match id {
        ScreenId::Overview => println!("  Commands: next, prev, reset"),
        ScreenId::LightReactions => println!("  Commands: fire, synthesize, pools"),
        ScreenId::CalvinCycle => {
            if let Some(calvin) = lab.calvin() {
                println!("  Stage: {}. Commands: fix, reduce, regenerate", calvin.stage().await);
            }
        }
        ScreenId::Comparison => println!("  Commands: pathway <c3|c4|cam>"),
    }
}

fn excitation_text(stage: ExcitationStage) -> &'static str {
    match stage {
        ExcitationStage::Absorption => "1/3 Antenna pigments absorb a photon.",
        ExcitationStage::Transfer => "2/3 Excitation energy hops to the P680 reaction centre.",
        ExcitationStage::ChargeSeparation => {
            "3/3 P680 ejects an electron to the primary acceptor; water splitting refills it."
        }
    }
}

fn profile_text(profile: &PathwayProfile) -> String {
    format!(
        "first carboxylase {:?}, CO2 concentration {:?}, photorespiration {:?}, extra ATP {}, habitat {:?}",
        profile.initial_carboxylase,
        profile.concentration,
        profile.photorespiration,
        if profile.extra_atp { "yes" } else { "no" },
        profile.habitat,
    )
}

fn wrong_screen(needed: ScreenId) {
    println!("  Not available here. Try `screen {}` first.", needed);
}

fn refused(refusal: &Refusal) {
    println!("  Refused: {}", refusal);
}
