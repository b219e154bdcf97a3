//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Component tag (e.g. "td-03"); empty for the whole engine
    pub component: String,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether to format logs as JSON
    pub json_logs: bool,

    /// Whether to collect Prometheus metrics
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "tudu-engine".to_string(),
            component: String::new(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TD_SERVICE_NAME`: Service name (default: tudu-engine)
    /// - `TD_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `TD_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `TD_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `TD_METRICS`: Collect metrics (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("TD_SERVICE_NAME").unwrap_or(defaults.service_name),
            component: defaults.component,
            log_level: lookup("TD_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: lookup("TD_CONSOLE_OUTPUT")
                .map(|v| !is_false(&v))
                .unwrap_or(defaults.console_output),
            json_logs: lookup("TD_JSON_LOGS")
                .map(|v| is_true(&v))
                .unwrap_or(is_container),
            metrics_enabled: lookup("TD_METRICS")
                .map(|v| !is_false(&v))
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Create configuration for a single component.
    pub fn for_component(component: &str) -> Self {
        let mut config = Self::from_env();
        config.component = component.to_string();
        config
    }

    /// Service name including the component tag.
    pub fn full_service_name(&self) -> String {
        if self.component.is_empty() {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.component)
        }
    }
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn is_false(value: &str) -> bool {
    value.eq_ignore_ascii_case("false") || value == "0"
}
