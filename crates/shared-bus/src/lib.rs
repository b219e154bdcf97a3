//! # Shared Bus - In-Process Event Bus
//!
//! Carries everything the engine tells the outside world: status changes,
//! chat activation for the creator/provider pair, and user notifications.
//!
//! ```text
//! ┌──────────────┐                    ┌────────────────────┐
//! │  Lifecycle   │                    │ Chat transport     │
//! │  Ratings     │    publish()       │ Notification svc   │
//! │  Reputation  │ ──────┐            │ Marketplace        │
//! └──────────────┘       │            └────────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Publishing never blocks and never fails: an event nobody listens to is
//! counted and dropped.

#![warn(clippy::all)]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, MarketplaceEvent, NotificationKind};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
