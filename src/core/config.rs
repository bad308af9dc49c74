//! Arena configuration with documented defaults
//!
//! Battle pacing lives in [`ArenaConfig`] (loadable from TOML); transport
//! settings for the reasoning service live in [`LlmConfig`] (read from the
//! environment so API keys never land in config files).

use crate::core::error::{ArenaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a single battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Hard cap on rounds before the evaluator decides the battle
    ///
    /// One combatant acts per round, so 20 rounds gives each side ten
    /// actions. Guards against duels where neither side lands damage.
    pub max_rounds: u32,

    /// How many of the most recent history lines go into each request
    ///
    /// Keeps prompt size flat no matter how long the battle runs.
    /// The impression already summarizes older events.
    pub history_window: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            max_rounds: 20,
            history_window: 2,
        }
    }
}

impl ArenaConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ArenaConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ArenaError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(ArenaError::Validation(
                "max_rounds must be at least 1".into(),
            ));
        }
        if self.history_window == 0 {
            return Err(ArenaError::Validation(
                "history_window must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Reasoning-service transport settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    /// Sampling temperature; a little creativity makes the narration livelier
    pub temperature: f32,
    /// Per-request timeout enforced by the HTTP client
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub const DEFAULT_API_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    pub const DEFAULT_TEMPERATURE: f32 = 0.8;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: Self::DEFAULT_API_URL.into(),
            model: Self::DEFAULT_MODEL.into(),
            temperature: Self::DEFAULT_TEMPERATURE,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read settings from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL, LLM_MODEL, LLM_TEMPERATURE, LLM_TIMEOUT_SECS
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| ArenaError::Config("LLM_API_KEY not set".into()))?;
        let mut config = Self::new(api_key);

        if let Ok(url) = std::env::var("LLM_API_URL") {
            config.api_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = std::env::var("LLM_TEMPERATURE") {
            config.temperature = raw
                .parse()
                .map_err(|_| ArenaError::Config(format!("Invalid LLM_TEMPERATURE: {}", raw)))?;
        }
        if let Ok(raw) = std::env::var("LLM_TIMEOUT_SECS") {
            config.timeout_secs = raw
                .parse()
                .map_err(|_| ArenaError::Config(format!("Invalid LLM_TIMEOUT_SECS: {}", raw)))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ArenaConfig::default();
        assert_eq!(config.max_rounds, 20);
        assert_eq!(config.history_window, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ArenaConfig::from_toml_str("max_rounds = 8").unwrap();
        assert_eq!(config.max_rounds, 8);
        assert_eq!(config.history_window, 2);
    }

    #[test]
    fn test_full_toml() {
        let config = ArenaConfig::from_toml_str(
            r#"
max_rounds = 30
history_window = 4
"#,
        )
        .unwrap();
        assert_eq!(config, ArenaConfig::new().with_max_rounds(30).with_history_window(4));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let result = ArenaConfig::from_toml_str("max_rounds = 0");
        assert!(matches!(result, Err(ArenaError::Validation(_))));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = ArenaConfig::new().with_history_window(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let result = ArenaConfig::from_toml_str("max_rounds = \"many\"");
        assert!(matches!(result, Err(ArenaError::Toml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ArenaConfig::load(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ArenaError::Config(_))));
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::new("key".into());
        assert_eq!(config.model, LlmConfig::DEFAULT_MODEL);
        assert!((config.temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.timeout_secs, 60);
    }
}
