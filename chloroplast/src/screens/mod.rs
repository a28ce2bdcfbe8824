//! The four lab screens and their identifiers.

pub mod calvin;
pub mod comparison;
pub mod light;
pub mod overview;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use tutor::TutorContext;

pub use calvin::{CalvinCycle, CycleStage, CycleWarning};
pub use comparison::{Pathway, PathwayComparison, PathwayProfile};
pub use light::{ElectronSite, LightReactions, TransportEffect};
pub use overview::{ExcitationStage, PrimaryReaction};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Closed set of navigable screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum ScreenId {
    #[default]
    #[serde(rename = "overview")]
    Overview,
    #[serde(rename = "light")]
    LightReactions,
    #[serde(rename = "dark")]
    CalvinCycle,
    #[serde(rename = "comparison")]
    Comparison,
}

impl ScreenId {
    pub const ALL: [ScreenId; 4] = [
        ScreenId::Overview,
        ScreenId::LightReactions,
        ScreenId::CalvinCycle,
        ScreenId::Comparison,
    ];

    /// Stable tag, also used as the tutor context.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenId::Overview => "overview",
            ScreenId::LightReactions => "light",
            ScreenId::CalvinCycle => "dark",
            ScreenId::Comparison => tutor::COMPARISON_CONTEXT,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScreenId::Overview => "Overview & primary reaction",
            ScreenId::LightReactions => "Light reactions: electron transport and photophosphorylation",
            ScreenId::CalvinCycle => "Dark reactions: the Calvin cycle",
            ScreenId::Comparison => "Carbon assimilation: C3 vs C4 vs CAM",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        ScreenId::ALL
            .into_iter()
            .find(|id| id.as_str() == tag)
            .or(match tag.as_str() {
                "calvin" => Some(ScreenId::CalvinCycle),
                _ => None,
            })
            .ok_or_else(|| format!("unknown screen: {}", s.trim()))
    }
}

impl From<ScreenId> for TutorContext {
    fn from(id: ScreenId) -> Self {
        TutorContext::new(id.as_str())
    }
}
