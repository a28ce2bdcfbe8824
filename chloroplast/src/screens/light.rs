//! Light-reaction screen: electron transport along the thylakoid membrane.
//!
//! A fired photon starts one sequencer run that carries an electron from PSII
//! to FNR, pumping protons into the lumen on the way and reducing one NADP⁺
//! at the end. Accumulated protons drive ATP synthase on demand.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::LightConfig;
use crate::feedback::FeedbackSlot;
use crate::gate::Refusal;
use crate::pool::{Pool, PoolId, PoolSnapshot, PoolStore};
use crate::sequencer::{RunHandle, SequenceStep, Sequencer, StepEffects};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Where the electron sits on the membrane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ElectronSite {
    Psii,
    Plastoquinone,
    CytochromeB6f,
    Plastocyanin,
    Psi,
    Ferredoxin,
    Fnr,
}

impl ElectronSite {
    /// Ordinal along the chain, PSII = 0.
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

/// Side effects of reaching a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEffect {
    /// Protons moved into the lumen
    PumpProtons(u64),
    /// NADP⁺ reduced to NADPH
    ReduceNadp,
}

/// The electron's route, offsets in ms from the photon hit.
///
/// Plastocyanin is passed through without a stop.
pub fn electron_transport_steps() -> Vec<SequenceStep<ElectronSite, TransportEffect>> {
    vec![
        SequenceStep::at(ElectronSite::Psii, 0),
        SequenceStep::at(ElectronSite::Plastoquinone, 1500)
            .with_effect(TransportEffect::PumpProtons(2)),
        SequenceStep::at(ElectronSite::CytochromeB6f, 3000)
            .with_effect(TransportEffect::PumpProtons(1)),
        SequenceStep::at(ElectronSite::Psi, 4500),
        SequenceStep::at(ElectronSite::Ferredoxin, 6000),
        SequenceStep::at(ElectronSite::Fnr, 7500).with_effect(TransportEffect::ReduceNadp),
    ]
}

/// Applies transport effects to the gradient and the shared store.
struct TransportEffects {
    gradient: Arc<RwLock<Pool>>,
    pools: PoolStore,
}

#[async_trait]
impl StepEffects<TransportEffect> for TransportEffects {
    async fn apply(&self, effect: &TransportEffect) {
        let result = match *effect {
            TransportEffect::PumpProtons(count) => {
                self.gradient.write().await.apply(count as i64)
            }
            TransportEffect::ReduceNadp => self.pools.apply(PoolId::Nadph, 1).await,
        };
        if let Err(e) = result {
            warn!(effect = ?effect, error = %e, "Transport effect dropped");
        }
    }
}

/// State of the light-reaction screen.
pub struct LightReactions {
    config: LightConfig,
    pools: PoolStore,
    gradient: Arc<RwLock<Pool>>,
    transport: Sequencer<ElectronSite, TransportEffect>,
    feedback: FeedbackSlot,
}

impl LightReactions {
    pub fn new(pools: PoolStore, config: LightConfig) -> Self {
        let gradient = Arc::new(RwLock::new(Pool::new("H+")));
        let effects = Arc::new(TransportEffects {
            gradient: Arc::clone(&gradient),
            pools: pools.clone(),
        });
        let transport = Sequencer::new(
            "electron-transport",
            ElectronSite::Psii,
            electron_transport_steps(),
            effects,
        );
        let feedback = FeedbackSlot::new(config.synthesis_feedback());

        Self {
            config,
            pools,
            gradient,
            transport,
            feedback,
        }
    }

    /// Fire a photon at PSII. Refused while an electron is still in transit.
    pub fn fire_photon(&self) -> Result<RunHandle, Refusal> {
        self.transport.start().ok_or(Refusal::AlreadyRunning)
    }

    /// Whether the photon/electron animation is active.
    pub fn is_transporting(&self) -> bool {
        self.transport.is_running()
    }

    pub fn electron_site(&self) -> ElectronSite {
        self.transport.position()
    }

    pub fn transport(&self) -> &Sequencer<ElectronSite, TransportEffect> {
        &self.transport
    }

    /// Protons currently in the lumen.
    pub async fn protons(&self) -> u64 {
        self.gradient.read().await.value()
    }

    /// Add (or remove) protons directly.
    pub async fn adjust_gradient(&self, delta: i64) -> Result<u64, Refusal> {
        Ok(self.gradient.write().await.apply(delta)?)
    }

    fn protons_per_atp(&self) -> u64 {
        self.config.protons_per_atp.max(1)
    }

    /// How many synthesis turns the gradient can pay for.
    pub async fn synthesis_available(&self) -> u64 {
        self.protons().await / self.protons_per_atp()
    }

    pub async fn can_synthesize(&self) -> bool {
        self.synthesis_available().await > 0
    }

    /// Spend one turn of protons on one ATP.
    pub async fn synthesize_atp(&self) -> Result<PoolSnapshot, Refusal> {
        let cost = self.protons_per_atp();
        let mut gradient = self.gradient.write().await;

        if gradient.value() < cost {
            let refusal = Refusal::Insufficient {
                resource: gradient.name(),
                required: cost,
                available: gradient.value(),
            };
            warn!(reason = %refusal, "ATP synthesis refused");
            return Err(refusal);
        }

        // Credit first: if it fails the gradient is still intact.
        self.pools.apply(PoolId::Atp, 1).await?;
        gradient.apply(-(cost as i64))?;
        drop(gradient);

        let after = self.pools.snapshot().await;
        info!(atp = after.atp, "ATP synthesized");
        self.feedback.show("+1 ATP");
        Ok(after)
    }

    /// Transient "+1 ATP" notice.
    pub fn feedback(&self) -> Option<String> {
        self.feedback.current()
    }
}
