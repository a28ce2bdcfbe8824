//! Configuration for the tutor bridge.

use serde::{Deserialize, Serialize};

/// Which provider dialect the bridge speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google generative-language API
    #[default]
    Gemini,
    /// Any OpenAI-compatible chat-completions endpoint
    OpenAi,
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" | "open-ai" => Ok(Provider::OpenAi),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Tutor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Provider dialect
    pub provider: Provider,
    /// Model identifier
    pub model: String,
    /// Endpoint override; the provider default is used when absent
    pub base_url: Option<String>,
    /// Language the persona is told to answer in
    pub response_language: String,
    /// Cap on generated tokens
    pub max_output_tokens: Option<u32>,
    /// Credential. Never written out.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: "gemini-3-flash-preview".to_string(),
            base_url: None,
            response_language: "Chinese".to_string(),
            max_output_tokens: None,
            api_key: None,
        }
    }
}

impl TutorConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Set the credential.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TutorConfig::default();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_yaml_never_carries_the_key() {
        let config = TutorConfig::default().with_api_key(Some("secret".to_string()));
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("secret"));

        let parsed = TutorConfig::from_yaml("provider: openai\nmodel: llama3.2\n").unwrap();
        assert_eq!(parsed.provider, Provider::OpenAi);
        assert_eq!(parsed.model, "llama3.2");
        assert_eq!(parsed.response_language, "Chinese");
        assert!(parsed.api_key.is_none());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<Provider>(), Ok(Provider::Gemini));
        assert_eq!("openai".parse::<Provider>(), Ok(Provider::OpenAi));
        assert!("claude".parse::<Provider>().is_err());
    }
}
