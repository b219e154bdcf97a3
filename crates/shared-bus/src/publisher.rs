//! # Event Publisher
//!
//! Publishing side of the bus. Components hold an `Arc<dyn EventPublisher>`;
//! the runtime and tests hold the concrete [`InMemoryEventBus`] so they can
//! subscribe.

use crate::events::{EventFilter, EventTopic, MarketplaceEvent};
use crate::subscriber::{
    EventStream, EventSubscriber, Registration, Subscription, SubscriptionTable,
};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Fire-and-forget. Returns how many subscribers the event reached.
    async fn publish(&self, event: MarketplaceEvent) -> usize;

    fn events_published(&self) -> u64;
}

/// Broadcast bus shared by every component of one engine instance.
///
/// Each subscriber gets its own buffer of `capacity` events; one that falls
/// further behind loses the oldest.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<MarketplaceEvent>,
    subscriptions: SubscriptionTable,
    events_published: AtomicU64,
    events_dropped: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscriptions: Arc::default(),
            events_published: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let registration = Registration::new(Arc::clone(&self.subscriptions), &filter);
        debug!(topics = ?filter.topics, recipient = ?filter.recipient, "Subscribed");
        Subscription::new(self.sender.subscribe(), filter, registration)
    }

    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.subscribe(filter).into_stream()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events published while nobody was subscribed.
    #[must_use]
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    /// Live subscriptions per topic; [`EventTopic::All`] counts unfiltered ones.
    #[must_use]
    pub fn subscriptions_by_topic(&self) -> HashMap<EventTopic, usize> {
        self.subscriptions.lock().clone()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: MarketplaceEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let topic = event.topic();
        let project = event.project();

        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(topic = topic.as_str(), project = ?project, receivers, "Event published");
                receivers
            }
            Err(_) => {
                self.events_dropped.fetch_add(1, Ordering::Relaxed);
                trace!(topic = topic.as_str(), project = ?project, "No subscribers, event dropped");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
