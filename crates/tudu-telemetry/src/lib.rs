//! # Tudu Telemetry
//!
//! Logging and metrics for the Tudu engine.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, human-readable or JSON
//! - **Metrics**: Prometheus counters and gauges fed from the event bus
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tudu_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let telemetry = init_telemetry(TelemetryConfig::from_env())?;
//!     // hand telemetry.metrics() to the event recorder
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TD_SERVICE_NAME` | `tudu-engine` | Service name in logs |
//! | `TD_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `TD_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `TD_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `TD_METRICS` | `true` | Collect Prometheus metrics |

#![warn(clippy::all)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::EngineMetrics;

use std::sync::Arc;
use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and, if enabled, the metrics registry.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = if config.metrics_enabled {
        Some(Arc::new(EngineMetrics::new()?))
    } else {
        None
    };
    init_logging(&config)?;

    Ok(TelemetryGuard {
        service: config.full_service_name(),
        metrics,
    })
}

/// Keeps telemetry state alive for the lifetime of the process.
pub struct TelemetryGuard {
    service: String,
    metrics: Option<Arc<EngineMetrics>>,
}

impl TelemetryGuard {
    pub fn metrics(&self) -> Option<Arc<EngineMetrics>> {
        self.metrics.clone()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service, "Shutting down telemetry");
    }
}

/// Span tagged with the emitting component.
///
/// ```rust,ignore
/// let _span = component_span!("select_applicant", component = "td-03", project = %id).entered();
/// ```
#[macro_export]
macro_rules! component_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
