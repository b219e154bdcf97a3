//! Prometheus metrics for the Tudu engine.
//!
//! All metrics follow the naming convention: `td_<area>_<metric>_<unit>`.
//! They are fed from the event bus, so no service has to know about them.
//!
//! ## Metric Types
//!
//! - **Counter**: monotonically increasing (e.g. `td_lifecycle_transitions_total`)
//! - **Gauge**: goes up and down (e.g. `td_chat_sessions_active`)

use crate::TelemetryError;
use prometheus::{CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use shared_bus::MarketplaceEvent;

/// Engine metrics with their own registry.
pub struct EngineMetrics {
    registry: Registry,
    /// Every event seen, by topic.
    events: CounterVec,
    /// Project status transitions, by edge.
    transitions: CounterVec,
    /// Notifications, by kind.
    notifications: CounterVec,
    /// Chat channels currently open.
    active_chats: Gauge,
    /// Users currently flagged by the reputation guard.
    flagged_users: Gauge,
}

impl EngineMetrics {
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let events = CounterVec::new(
            Opts::new("td_events_total", "Events published on the engine bus"),
            &["topic"],
        )
        .map_err(metrics_err)?;
        let transitions = CounterVec::new(
            Opts::new(
                "td_lifecycle_transitions_total",
                "Project status transitions",
            ),
            &["from", "to"],
        )
        .map_err(metrics_err)?;
        let notifications = CounterVec::new(
            Opts::new("td_notifications_total", "Notifications emitted"),
            &["kind"],
        )
        .map_err(metrics_err)?;
        let active_chats = Gauge::new("td_chat_sessions_active", "Open project chat channels")
            .map_err(metrics_err)?;
        let flagged_users = Gauge::new(
            "td_reputation_flagged_users",
            "Users with reduced marketplace visibility",
        )
        .map_err(metrics_err)?;

        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(events.clone()),
            Box::new(transitions.clone()),
            Box::new(notifications.clone()),
            Box::new(active_chats.clone()),
            Box::new(flagged_users.clone()),
        ];
        for collector in collectors {
            registry.register(collector).map_err(metrics_err)?;
        }

        Ok(Self {
            registry,
            events,
            transitions,
            notifications,
            active_chats,
            flagged_users,
        })
    }

    /// Account for one bus event.
    pub fn record(&self, event: &MarketplaceEvent) {
        self.events
            .with_label_values(&[event.topic().as_str()])
            .inc();

        match event {
            MarketplaceEvent::ProjectStatusChanged { from, to, .. } => {
                let (from, to) = (from.to_string(), to.to_string());
                self.transitions
                    .with_label_values(&[from.as_str(), to.as_str()])
                    .inc();
            }
            MarketplaceEvent::ChatActivated { .. } => self.active_chats.inc(),
            MarketplaceEvent::ChatDeactivated { .. } => self.active_chats.dec(),
            MarketplaceEvent::Notification { kind, .. } => {
                self.notifications.with_label_values(&[kind.as_str()]).inc();
            }
            MarketplaceEvent::VisibilityChanged { flagged, .. } => {
                if *flagged {
                    self.flagged_users.inc();
                } else {
                    self.flagged_users.dec();
                }
            }
        }
    }

    pub fn transitions(&self, from: &str, to: &str) -> u64 {
        self.transitions.with_label_values(&[from, to]).get() as u64
    }

    pub fn notifications(&self, kind: &str) -> u64 {
        self.notifications.with_label_values(&[kind]).get() as u64
    }

    pub fn active_chats(&self) -> i64 {
        self.active_chats.get() as i64
    }

    pub fn flagged_users(&self) -> i64 {
        self.flagged_users.get() as i64
    }

    /// Text exposition format for scraping.
    pub fn render(&self) -> Result<String, TelemetryError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_err)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}

fn metrics_err(e: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsInit(e.to_string())
}
