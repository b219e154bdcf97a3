//! # Engine Configuration
//!
//! Aggregate configuration for every component, loaded from an optional JSON
//! file and then overridden by environment variables.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `TD_CONFIG_FILE` | JSON file with any subset of [`EngineConfig`] |
//! | `TD_PROCESSOR_MAX_ATTEMPTS` | `escrow.retry.max_attempts` |
//! | `TD_PROCESSOR_TIMEOUT_MS` | `escrow.retry.call_timeout_ms` |
//! | `TD_PROCESSOR_BACKOFF_MS` | `escrow.retry.initial_backoff_ms` |
//! | `TD_REPUTATION_WINDOW` | `reputation.window` |
//! | `TD_REPUTATION_THRESHOLD` | `reputation.threshold` |
//! | `TD_EVENT_BUS_CAPACITY` | `event_bus_capacity` |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use td_01_escrow_ledger::EscrowConfig;
use td_02_application_registry::RegistryConfig;
use td_03_project_lifecycle::LifecycleConfig;
use td_05_reputation_guard::ReputationConfig;
use thiserror::Error;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Escrow ledger and processor retry policy.
    pub escrow: EscrowConfig,
    /// Application registry limits.
    pub registry: RegistryConfig,
    /// Project listing limits.
    pub lifecycle: LifecycleConfig,
    /// Reputation window and threshold.
    pub reputation: ReputationConfig,
    /// Broadcast buffer per subscriber.
    pub event_bus_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            escrow: EscrowConfig::default(),
            registry: RegistryConfig::default(),
            lifecycle: LifecycleConfig::default(),
            reputation: ReputationConfig::default(),
            event_bus_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {reason}")]
    File { path: String, reason: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl EngineConfig {
    /// Load from `TD_CONFIG_FILE` (if set) and environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("TD_CONFIG_FILE") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let retry = &mut config.escrow.retry;
        override_with(&lookup, "TD_PROCESSOR_MAX_ATTEMPTS", &mut retry.max_attempts)?;
        override_with(&lookup, "TD_PROCESSOR_TIMEOUT_MS", &mut retry.call_timeout_ms)?;
        override_with(&lookup, "TD_PROCESSOR_BACKOFF_MS", &mut retry.initial_backoff_ms)?;
        override_with(&lookup, "TD_REPUTATION_WINDOW", &mut config.reputation.window)?;
        override_with(&lookup, "TD_REPUTATION_THRESHOLD", &mut config.reputation.threshold)?;
        override_with(&lookup, "TD_EVENT_BUS_CAPACITY", &mut config.event_bus_capacity)?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file_err = |reason: String| ConfigError::File {
            path: path.display().to_string(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| file_err(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reputation
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.escrow.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "escrow.retry.max_attempts must be >= 1".into(),
            ));
        }
        if self.escrow.retry.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "escrow.retry.call_timeout_ms must be > 0".into(),
            ));
        }
        if self.event_bus_capacity == 0 {
            return Err(ConfigError::Invalid("event_bus_capacity must be > 0".into()));
        }
        Ok(())
    }
}

fn override_with<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *target = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
        })?;
    }
    Ok(())
}
