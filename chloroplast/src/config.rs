//! Configuration for the lab screens.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Errors from loading lab configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A cost too large to debit as a signed delta
    #[error("{field} = {value} exceeds the largest debit ({max})", max = i64::MAX)]
    CostOutOfRange { field: &'static str, value: u64 },
}

/// Configuration for every simulation screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Light-reaction screen
    pub light: LightConfig,
    /// Calvin-cycle screen
    pub calvin: CalvinConfig,
}

impl LabConfig {
    /// Load and validate config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Every cost must fit a signed pool delta.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let costs = [
            ("light.protons_per_atp", self.light.protons_per_atp),
            ("calvin.reduction_atp", self.calvin.reduction_atp),
            ("calvin.reduction_nadph", self.calvin.reduction_nadph),
            ("calvin.regeneration_atp", self.calvin.regeneration_atp),
        ];
        match costs.into_iter().find(|&(_, value)| i64::try_from(value).is_err()) {
            Some((field, value)) => Err(ConfigError::CostOutOfRange { field, value }),
            None => Ok(()),
        }
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Light-reaction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Protons consumed per ATP synthesized
    pub protons_per_atp: u64,
    /// How long the "+1 ATP" notice stays up (ms)
    pub synthesis_feedback_ms: u64,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            protons_per_atp: 3,
            synthesis_feedback_ms: 1000,
        }
    }
}

impl LightConfig {
    pub fn synthesis_feedback(&self) -> Duration {
        Duration::from_millis(self.synthesis_feedback_ms)
    }
}

/// Calvin-cycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalvinConfig {
    /// ATP consumed by reduction
    pub reduction_atp: u64,
    /// NADPH consumed by reduction
    pub reduction_nadph: u64,
    /// ATP consumed by RuBP regeneration
    pub regeneration_atp: u64,
    /// How long the cost notice stays up (ms)
    pub feedback_ms: u64,
}

impl Default for CalvinConfig {
    fn default() -> Self {
        Self {
            reduction_atp: 1,
            reduction_nadph: 1,
            regeneration_atp: 1,
            feedback_ms: 2000,
        }
    }
}

impl CalvinConfig {
    pub fn feedback(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }
}
