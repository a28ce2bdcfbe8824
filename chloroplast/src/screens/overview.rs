//! Overview screen: the primary reaction as a three-stage walkthrough.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Stage of the primary reaction being shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ExcitationStage {
    /// Antenna pigments absorb a photon
    #[default]
    Absorption,
    /// Resonance energy transfer toward the reaction centre
    Transfer,
    /// P680 ejects an electron to the primary acceptor
    ChargeSeparation,
}

impl ExcitationStage {
    pub const ALL: [ExcitationStage; 3] = [
        ExcitationStage::Absorption,
        ExcitationStage::Transfer,
        ExcitationStage::ChargeSeparation,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Stepper over [`ExcitationStage`], clamped at both ends.
#[derive(Debug, Clone, Default)]
pub struct PrimaryReaction {
    stage: ExcitationStage,
}

impl PrimaryReaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> ExcitationStage {
        self.stage
    }

    pub fn can_go_back(&self) -> bool {
        self.stage.index() > 0
    }

    pub fn can_advance(&self) -> bool {
        self.stage.index() + 1 < ExcitationStage::ALL.len()
    }

    /// Step forward; stays put on the last stage.
    pub fn next(&mut self) -> ExcitationStage {
        if self.can_advance() {
            self.stage = ExcitationStage::ALL[self.stage.index() + 1];
        }
        self.stage
    }

    /// Step back; stays put on the first stage.
    pub fn previous(&mut self) -> ExcitationStage {
        if self.can_go_back() {
            self.stage = ExcitationStage::ALL[self.stage.index() - 1];
        }
        self.stage
    }

    pub fn reset(&mut self) -> ExcitationStage {
        self.stage = ExcitationStage::Absorption;
        self.stage
    }

    /// Charge separation has been reached.
    pub fn is_complete(&self) -> bool {
        self.stage == ExcitationStage::ChargeSeparation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walkthrough_is_clamped() {
        let mut walkthrough = PrimaryReaction::new();
        assert!(!walkthrough.can_go_back());
        assert_eq!(walkthrough.previous(), ExcitationStage::Absorption);

        assert_eq!(walkthrough.next(), ExcitationStage::Transfer);
        assert_eq!(walkthrough.next(), ExcitationStage::ChargeSeparation);
        assert!(walkthrough.is_complete());
        assert!(!walkthrough.can_advance());
        assert_eq!(walkthrough.next(), ExcitationStage::ChargeSeparation);

        assert_eq!(walkthrough.previous(), ExcitationStage::Transfer);
        assert_eq!(walkthrough.reset(), ExcitationStage::Absorption);
    }
}
