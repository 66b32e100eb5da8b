//! Provider credential configuration.
//!
//! Secrets are read from `~/.config/scadcollab/secret.json`. Each
//! provider has its own entry; a missing entry means that provider is
//! not configured, which is a per-path error, not a startup failure.

use scadcollab_core::error::{CollabError, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Root structure of secret.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
    #[serde(default)]
    pub vision: Option<VisionConfig>,
}

/// Text-generation provider credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Vision chat provider credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Loads the secret configuration file from ~/.config/scadcollab/secret.json
pub fn load_secret_config() -> Result<SecretConfig> {
    let config_path = secret_config_path()?;

    if !config_path.exists() {
        return Err(CollabError::config(format!(
            "configuration file not found at: {}",
            config_path.display()
        )));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        CollabError::config(format!(
            "failed to read configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        CollabError::config(format!(
            "failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })
}

/// Returns the path to the configuration file: ~/.config/scadcollab/secret.json
fn secret_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CollabError::config("could not determine home directory"))?;
    Ok(home.join(".config").join("scadcollab").join("secret.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_config() {
        let json = r#"{
            "gemini": { "api_key": "g-key", "model_name": "gemini-2.5-flash" },
            "vision": { "api_key": "v-key" }
        }"#;
        let config: SecretConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.gemini.as_ref().unwrap().api_key, "g-key");
        assert_eq!(
            config.gemini.unwrap().model_name.as_deref(),
            Some("gemini-2.5-flash")
        );
        assert!(config.vision.unwrap().model_name.is_none());
    }

    #[test]
    fn test_missing_providers_deserialize_as_none() {
        let config: SecretConfig = serde_json::from_str("{}").unwrap();
        assert!(config.gemini.is_none());
        assert!(config.vision.is_none());
    }
}
