//! # Event Subscriber
//!
//! Receiving side of the bus. A [`Subscription`] filters the broadcast
//! channel by topic and recipient; [`EventStream`] is the same thing as a
//! `Stream`.

use crate::events::{EventFilter, EventTopic, MarketplaceEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Live subscriptions per topic.
pub(crate) type SubscriptionTable = Arc<Mutex<HashMap<EventTopic, usize>>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Event bus closed")]
    Closed,
}

/// Anything consumers can subscribe on.
pub trait EventSubscriber: Send + Sync {
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// Counts one subscription in the table for as long as it lives.
pub(crate) struct Registration {
    table: SubscriptionTable,
    topics: Vec<EventTopic>,
}

impl Registration {
    pub(crate) fn new(table: SubscriptionTable, filter: &EventFilter) -> Self {
        let topics = if filter.topics.is_empty() {
            vec![EventTopic::All]
        } else {
            filter.topics.clone()
        };
        {
            let mut counts = table.lock();
            for topic in &topics {
                *counts.entry(*topic).or_insert(0) += 1;
            }
        }
        Self { table, topics }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut counts = self.table.lock();
        for topic in &self.topics {
            if let Some(count) = counts.get_mut(topic) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    counts.remove(topic);
                }
            }
        }
        debug!(topics = ?self.topics, "Subscription dropped");
    }
}

/// A filtered view of the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<MarketplaceEvent>,
    filter: EventFilter,
    registration: Registration,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<MarketplaceEvent>,
        filter: EventFilter,
        registration: Registration,
    ) -> Self {
        Self {
            receiver,
            filter,
            registration,
        }
    }

    /// Next matching event, or `None` once every publisher is gone.
    ///
    /// A lagging subscriber skips what it missed and carries on.
    pub async fn recv(&mut self) -> Option<MarketplaceEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event if one is already buffered.
    pub fn try_recv(&mut self) -> Result<Option<MarketplaceEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
            }
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    #[must_use]
    pub fn into_stream(self) -> EventStream {
        EventStream {
            inner: BroadcastStream::new(self.receiver),
            filter: self.filter,
            _registration: self.registration,
        }
    }
}

/// A [`Subscription`] consumed as a `Stream`.
pub struct EventStream {
    inner: BroadcastStream<MarketplaceEvent>,
    filter: EventFilter,
    _registration: Registration,
}

impl EventStream {
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = MarketplaceEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(event)) if self.filter.matches(&event) => return Poll::Ready(Some(event)),
                Some(Ok(_)) => {}
                Some(Err(BroadcastStreamRecvError::Lagged(missed))) => {
                    debug!(missed, "Event stream lagged");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
