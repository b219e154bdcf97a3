//! # Tudu Engine Runtime
//!
//! Wires the project lifecycle and escrow engine and runs it.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and dependency wiring
//! - `handlers/` - Background consumers of the event bus
//! - `demo` - End-to-end demonstration flow
//!
//! ## Control Flow
//!
//! ```text
//! ApplicationRegistry(2) ──candidates──→ ProjectLifecycle(3) ──hold/release/refund──→ EscrowLedger(1)
//!                                               │
//!                                               └──completed──→ RatingCollector(4) ──recompute──→ ReputationGuard(5)
//!
//! All components ──events──→ Event Bus ──→ EventRecorder (metrics), chat, notifications
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load configuration (file, then environment)
//! 3. Build components in dependency order
//! 4. Start event handlers
//! 5. Signal ready

#![warn(clippy::all)]

pub mod container;
pub mod demo;
pub mod handlers;

use crate::container::{EngineConfig, EngineContainer};
use crate::handlers::EventRecorder;
use anyhow::Result;
use shared_bus::EventFilter;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tudu_telemetry::EngineMetrics;

/// The engine runtime: container plus background handlers.
pub struct EngineRuntime {
    container: Arc<EngineContainer>,
    metrics: Option<Arc<EngineMetrics>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handlers: Mutex<Vec<JoinHandle<()>>>,
}

impl EngineRuntime {
    pub fn new(config: EngineConfig, metrics: Option<Arc<EngineMetrics>>) -> Result<Self> {
        Ok(Self::from_container(EngineContainer::new(config)?, metrics))
    }

    pub fn from_container(container: EngineContainer, metrics: Option<Arc<EngineMetrics>>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            metrics,
            shutdown_tx,
            shutdown_rx,
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Start the background handlers.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Tudu Engine Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let recorder = EventRecorder::new(
            self.container.bus.subscribe(EventFilter::all()),
            self.metrics.clone(),
        );
        let mut shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                handled = recorder.run() => {
                    info!(handled, "[recorder] Finished");
                }
                _ = shutdown.changed() => {
                    info!("[recorder] Shutdown signal received");
                }
            }
        });
        self.handlers.lock().await.push(handle);

        info!("Event handlers started");
        Ok(())
    }

    /// Signal shutdown and wait for handlers to exit.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if self.shutdown_tx.send(true).is_err() {
            warn!("No handler was listening for shutdown");
        }
        let handlers = std::mem::take(&mut *self.handlers.lock().await);
        for handle in handlers {
            if let Err(e) = handle.await {
                warn!(error = %e, "Handler task failed");
            }
        }
        let pruned = self.container.lifecycle.prune_locks()
            + self.container.ledger.prune_locks()
            + self.container.reputation.prune_locks();
        info!(pruned_locks = pruned, "Shutdown complete");
    }

    pub fn container(&self) -> Arc<EngineContainer> {
        Arc::clone(&self.container)
    }

    pub fn metrics(&self) -> Option<Arc<EngineMetrics>> {
        self.metrics.clone()
    }
}
