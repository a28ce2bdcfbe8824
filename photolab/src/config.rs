//! On-disk configuration: one YAML file with `lab` and `tutor` sections.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use chloroplast::LabConfig;
use tutor::TutorConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lab: LabConfig,
    pub tutor: TutorConfig,
}

impl Config {
    /// Read `path`, or use defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .lab
            .validate()
            .with_context(|| format!("validating config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_are_optional() {
        let config: Config = serde_yaml::from_str("tutor:\n  model: other-model\n").unwrap();
        assert_eq!(config.tutor.model, "other-model");
        assert_eq!(config.lab.light.protons_per_atp, 3);
        assert!(Config::load(None).is_ok());
    }

    #[test]
    fn test_oversized_cost_fails_to_load() {
        let path = std::env::temp_dir().join(format!("photolab-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "lab:\n  calvin:\n    regeneration_atp: 18446744073709551615\n").unwrap();
        let result = Config::load(Some(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
