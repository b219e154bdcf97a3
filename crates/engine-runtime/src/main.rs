//! # Tudu Engine
//!
//! Starts the engine, runs the demonstration flow, prints metrics and exits.

use anyhow::{Context, Result};
use engine_runtime::container::EngineConfig;
use engine_runtime::{demo, EngineRuntime};
use tracing::info;
use tudu_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    let runtime = EngineRuntime::new(config, telemetry.metrics())?;
    runtime.start().await?;

    let report = demo::run_demo(&runtime.container()).await?;
    info!(
        provider = %report.provider,
        average = ?report.provider_reputation.average,
        flagged = report.provider_reputation.visibility_flag,
        custody = report.custody,
        "Demo report"
    );

    // Let the recorder drain before reading metrics.
    tokio::task::yield_now().await;
    runtime.shutdown().await;

    if let Some(metrics) = runtime.metrics() {
        println!("{}", metrics.render()?);
    }
    Ok(())
}
