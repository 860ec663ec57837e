//! Session and response engine configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) yields a usable configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TutorError};

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "SHELLTUTOR_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TutorConfig {
    pub engine: EngineConfig,
    pub session: SessionConfig,
}

/// Response engine connection settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "SHELLTUTOR_API_KEY".to_string(),
            timeout_secs: 30,
            temperature: 0.2,
        }
    }
}

/// Interactive session behavior.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Answer commands with the built-in scripted engine instead of the
    /// remote one.
    pub offline: bool,
    /// Print the simulated home tree when the session starts.
    pub show_tree_on_start: bool,
}

impl TutorConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| TutorError::Config(format!("config: {e}")))
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TutorError::Config(format!("{}: {e}", path.display())))?;
        let config = toml::from_str(&text)
            .map_err(|e| TutorError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the config from an explicit path, then [`CONFIG_ENV`], then
    /// defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }
}
