use crate::error::{FlashdeckError, Result};
use crate::generation::GenerationMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_GENERATION_URL: &str = "https://memoforce-back.onrender.com/generate";
const DEFAULT_CARD_COUNT: u32 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const KEYS: [&str; 4] = [
    "generation-url",
    "default-card-count",
    "default-mode",
    "request-timeout-secs",
];

/// Configuration for flashdeck, stored in `config.json` inside the data directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashdeckConfig {
    /// Endpoint of the card generation service
    #[serde(default = "default_generation_url")]
    pub generation_url: String,

    /// How many cards `generate` asks for when no count is given
    #[serde(default = "default_card_count")]
    pub default_card_count: u32,

    /// Generation mode used when none is given
    #[serde(default)]
    pub default_mode: GenerationMode,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_generation_url() -> String {
    DEFAULT_GENERATION_URL.to_string()
}

fn default_card_count() -> u32 {
    DEFAULT_CARD_COUNT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for FlashdeckConfig {
    fn default() -> Self {
        Self {
            generation_url: default_generation_url(),
            default_card_count: DEFAULT_CARD_COUNT,
            default_mode: GenerationMode::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FlashdeckConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(FlashdeckError::Io)?;
        let config: FlashdeckConfig =
            serde_json::from_str(&content).map_err(FlashdeckError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(FlashdeckError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(FlashdeckError::Serialization)?;
        fs::write(config_path, content).map_err(FlashdeckError::Io)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "generation-url" => Some(self.generation_url.clone()),
            "default-card-count" => Some(self.default_card_count.to_string()),
            "default-mode" => Some(self.default_mode.to_string()),
            "request-timeout-secs" => Some(self.request_timeout_secs.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "generation-url" => {
                if value.trim().is_empty() {
                    return Err("generation-url cannot be empty".to_string());
                }
                self.generation_url = value.trim().to_string();
            }
            "default-card-count" => {
                let count: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid card count: {}", value))?;
                if count == 0 {
                    return Err("default-card-count must be at least 1".to_string());
                }
                self.default_card_count = count;
            }
            "default-mode" => {
                self.default_mode = value.parse().map_err(|e: FlashdeckError| e.to_string())?;
            }
            "request-timeout-secs" => {
                self.request_timeout_secs = value
                    .parse()
                    .map_err(|_| format!("Invalid timeout: {}", value))?;
            }
            other => return Err(format!("Unknown config key: {}", other)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FlashdeckConfig::default();
        assert_eq!(config.default_card_count, 5);
        assert_eq!(config.default_mode, GenerationMode::Basic);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = FlashdeckConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, FlashdeckConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut config = FlashdeckConfig::default();
        config.set("default-mode", "code").unwrap();
        config.set("default-card-count", "8").unwrap();
        config.save(temp_dir.path()).unwrap();

        let loaded = FlashdeckConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.default_mode, GenerationMode::Code);
        assert_eq!(loaded.default_card_count, 8);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            r#"{"default_card_count": 3}"#,
        )
        .unwrap();

        let config = FlashdeckConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.default_card_count, 3);
        assert_eq!(config.generation_url, DEFAULT_GENERATION_URL);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = FlashdeckConfig::default();
        assert!(config.set("default-card-count", "zero").is_err());
        assert!(config.set("default-card-count", "0").is_err());
        assert!(config.set("default-mode", "poetry").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, FlashdeckConfig::default());
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = FlashdeckConfig::default();
        for key in KEYS {
            assert!(config.get(key).is_some(), "missing {}", key);
        }
    }
}
