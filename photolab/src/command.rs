//! Line commands accepted by the lab prompt.

use std::str::FromStr;

use chloroplast::screens::Pathway;
use chloroplast::ScreenId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Screen(ScreenId),
    Pools,
    /// Fire a photon at PSII
    Fire,
    Synthesize,
    Fix,
    Reduce,
    Regenerate,
    /// Primary-reaction walkthrough
    Next,
    Prev,
    Reset,
    Pathway(Pathway),
    /// Toggle the tutor panel
    Chat,
    Ask(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
screen <overview|light|dark|comparison>  switch screen
pools                                    show ATP and NADPH
fire                                     fire a photon at PSII (light)
synthesize                               run ATP synthase (light)
fix | reduce | regenerate                Calvin cycle actions (dark)
next | prev | reset                      primary reaction steps (overview)
pathway <c3|c4|cam>                      select a pathway (comparison)
chat                                     show or hide the tutor
ask <question>                           ask the tutor
help                                     this list
quit                                     leave the lab";

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "screen" | "go" => Command::Screen(rest.parse()?),
            "pools" => Command::Pools,
            "fire" | "photon" => Command::Fire,
            "synthesize" | "synth" => Command::Synthesize,
            "fix" => Command::Fix,
            "reduce" => Command::Reduce,
            "regenerate" => Command::Regenerate,
            "next" => Command::Next,
            "prev" | "back" => Command::Prev,
            "reset" => Command::Reset,
            "pathway" => Command::Pathway(rest.parse()?),
            "chat" => Command::Chat,
            "ask" if rest.is_empty() => return Err("ask needs a question".to_string()),
            "ask" => Command::Ask(rest.to_string()),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command: {}", other)),
        };

        // Only `screen`, `pathway` and `ask` take an argument.
        if !rest.is_empty()
            && !matches!(
                command,
                Command::Screen(_) | Command::Pathway(_) | Command::Ask(_)
            )
        {
            return Err(format!("{} takes no argument", word));
        }
        Ok(command)
    }
}
