//! # Event Recorder
//!
//! Counts every bus event into the engine metrics and traces it. Stands in
//! for the notification and chat transports, which consume the same stream.

use shared_bus::{MarketplaceEvent, Subscription};
use std::sync::Arc;
use tracing::{debug, info};
use tudu_telemetry::EngineMetrics;

/// Handler that drains a bus subscription into metrics.
pub struct EventRecorder {
    subscription: Subscription,
    metrics: Option<Arc<EngineMetrics>>,
}

impl EventRecorder {
    pub fn new(subscription: Subscription, metrics: Option<Arc<EngineMetrics>>) -> Self {
        Self {
            subscription,
            metrics,
        }
    }

    /// Handle one event.
    pub fn handle(&self, event: &MarketplaceEvent) {
        if let Some(metrics) = &self.metrics {
            metrics.record(event);
        }
        match event {
            MarketplaceEvent::Notification {
                recipient,
                kind,
                project,
            } => debug!(
                recipient = %recipient,
                kind = kind.as_str(),
                project = %project,
                "Notification dispatched"
            ),
            MarketplaceEvent::ChatActivated {
                project,
                party_a,
                party_b,
            } => debug!(project = %project, party_a = %party_a, party_b = %party_b, "Chat opened"),
            MarketplaceEvent::ChatDeactivated { project } => {
                debug!(project = %project, "Chat closed")
            }
            other => debug!(topic = other.topic().as_str(), "Event recorded"),
        }
    }

    /// Run until the bus closes. Returns the number of events handled.
    pub async fn run(mut self) -> u64 {
        info!("[recorder] Event recorder started");
        let mut handled = 0u64;
        while let Some(event) = self.subscription.recv().await {
            self.handle(&event);
            handled += 1;
        }
        info!(handled, "[recorder] Event bus closed");
        handled
    }
}
