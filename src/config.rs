//! Configuration for the key decoder
//!
//! A snapshot of everything that can be tuned on a [`crate::TermKey`],
//! loadable from `~/.config/termkey/config.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use termkey_parser::{CanonFlags, Flags};

use crate::buffer::DEFAULT_BUFFER_SIZE;

/// Default time to wait for the rest of an ambiguous sequence
pub const DEFAULT_WAIT_TIME_MS: u64 = 50;

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decoder flags
    pub flags: Flags,
    /// Canonicalisation flags
    pub canon_flags: CanonFlags,
    /// Milliseconds to wait before resolving an ambiguous prefix
    pub wait_time_ms: u64,
    /// Input buffer capacity in bytes
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flags: Flags::empty(),
            canon_flags: CanonFlags::empty(),
            wait_time_ms: DEFAULT_WAIT_TIME_MS,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("ignoring {}: {}", config_path.display(), e);
                    }
                }
            }
        }
        Self::default()
    }
}

/// `~/.config/termkey/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("termkey")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.wait_time_ms, 50);
        assert_eq!(config.buffer_size, 256);
        assert!(config.flags.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            flags: Flags::UTF8 | Flags::CTRLC,
            canon_flags: CanonFlags::DELBS,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("UTF8 | CTRLC"));
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = serde_json::from_str(r#"{"wait_time_ms": 10}"#).unwrap();
        assert_eq!(config.wait_time_ms, 10);
        assert_eq!(config.buffer_size, 256);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            buffer_size: 1024,
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Json(_))));
    }
}
