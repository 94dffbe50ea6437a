//! Bridge configuration (TOML)
//!
//! Accepted either at top level or under a `[bridge]` table, so it can live
//! inside a larger application config:
//!
//! ```toml
//! [bridge]
//! label = "libui"
//! reuse_policy = "reject"
//! registry_capacity = 256
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// What `create` does when the address already has a registry entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReusePolicy {
    /// Replace the entry (the address was reused after an external free)
    #[default]
    Overwrite,
    /// Refuse with `AddressInUse`; the subsystem must invalidate first
    Reject,
}

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Prefix for raised error messages (default: "tether")
    #[serde(default = "default_label")]
    pub label: String,

    /// Collision handling in `create`
    #[serde(default)]
    pub reuse_policy: ReusePolicy,

    /// Initial registry capacity
    #[serde(default = "default_registry_capacity")]
    pub registry_capacity: usize,
}

#[derive(Deserialize)]
struct Wrapped {
    bridge: BridgeConfig,
}

fn default_label() -> String {
    "tether".to_string()
}

fn default_registry_capacity() -> usize {
    64
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            reuse_policy: ReusePolicy::default(),
            registry_capacity: default_registry_capacity(),
        }
    }
}

impl BridgeConfig {
    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(toml_str)?;
        let config = if table.contains_key("bridge") {
            toml::from_str::<Wrapped>(toml_str)?.bridge
        } else {
            toml::from_str::<BridgeConfig>(toml_str)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationError(format!("Failed to serialize: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "label cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
