//! # Marketplace Events
//!
//! Every event the engine emits toward its external collaborators: the chat
//! transport, the notification service and the marketplace listing.
//! Delivery is fire-and-forget; the engine never waits on a consumer.

use serde::{Deserialize, Serialize};
use shared_types::entities::{ProjectId, ProjectStatus, UserId};

/// Kinds of user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    /// Creator: someone applied to the project.
    ApplicationReceived,
    /// Applicant: they were selected.
    Selected,
    /// Applicant: their application was closed or rejected.
    ApplicationClosed,
    /// Creator: the provider submitted a delivery.
    DeliverySubmitted,
    /// Provider: the creator asked for a revision.
    RevisionRequested,
    /// Both parties: the project completed.
    Completed,
    /// Both parties: the project was cancelled.
    Cancelled,
    /// Both parties: please rate the counterparty.
    RatingPrompt,
    /// Creator: funds are held in escrow.
    PaymentHeld,
    /// Provider: funds were released.
    PaymentReleased,
    /// Creator: funds were refunded.
    PaymentRefunded,
    /// Creator: the payment processor could not hold the funds.
    PaymentFailed,
}

impl NotificationKind {
    /// Wire name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationReceived => "applicationReceived",
            Self::Selected => "selected",
            Self::ApplicationClosed => "applicationClosed",
            Self::DeliverySubmitted => "deliverySubmitted",
            Self::RevisionRequested => "revisionRequested",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::RatingPrompt => "ratingPrompt",
            Self::PaymentHeld => "paymentHeld",
            Self::PaymentReleased => "paymentReleased",
            Self::PaymentRefunded => "paymentRefunded",
            Self::PaymentFailed => "paymentFailed",
        }
    }
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketplaceEvent {
    // =========================================================================
    // LIFECYCLE
    // =========================================================================
    /// A project moved along its status machine.
    ProjectStatusChanged {
        project: ProjectId,
        from: ProjectStatus,
        to: ProjectStatus,
    },

    // =========================================================================
    // CHAT TRANSPORT
    // =========================================================================
    /// Open a private channel between creator and provider.
    ChatActivated {
        project: ProjectId,
        party_a: UserId,
        party_b: UserId,
    },

    /// Close the project's channel.
    ChatDeactivated { project: ProjectId },

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================
    /// A notification for one user.
    Notification {
        recipient: UserId,
        kind: NotificationKind,
        project: ProjectId,
    },

    // =========================================================================
    // REPUTATION
    // =========================================================================
    /// A user's visibility flag flipped after recomputation.
    VisibilityChanged { user: UserId, flagged: bool },
}

impl MarketplaceEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ProjectStatusChanged { .. } => EventTopic::Lifecycle,
            Self::ChatActivated { .. } | Self::ChatDeactivated { .. } => EventTopic::Chat,
            Self::Notification { .. } => EventTopic::Notifications,
            Self::VisibilityChanged { .. } => EventTopic::Reputation,
        }
    }

    /// The project this event concerns, if any.
    #[must_use]
    pub fn project(&self) -> Option<ProjectId> {
        match self {
            Self::ProjectStatusChanged { project, .. }
            | Self::ChatActivated { project, .. }
            | Self::ChatDeactivated { project }
            | Self::Notification { project, .. } => Some(*project),
            Self::VisibilityChanged { .. } => None,
        }
    }

    /// Users addressed by this event.
    #[must_use]
    pub fn recipients(&self) -> Vec<UserId> {
        match self {
            Self::ChatActivated {
                party_a, party_b, ..
            } => vec![*party_a, *party_b],
            Self::Notification { recipient, .. } => vec![*recipient],
            Self::VisibilityChanged { user, .. } => vec![*user],
            Self::ProjectStatusChanged { .. } | Self::ChatDeactivated { .. } => Vec::new(),
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Project status transitions.
    Lifecycle,
    /// Chat channel activation and deactivation.
    Chat,
    /// User notifications.
    Notifications,
    /// Visibility flag changes.
    Reputation,
    /// All events (no filtering).
    All,
}

impl EventTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lifecycle => "lifecycle",
            Self::Chat => "chat",
            Self::Notifications => "notifications",
            Self::Reputation => "reputation",
            Self::All => "all",
        }
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Only events addressed to this user. `None` means any.
    pub recipient: Option<UserId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            recipient: None,
        }
    }

    /// Create a filter for events addressed to one user.
    #[must_use]
    pub fn for_recipient(user: UserId) -> Self {
        Self {
            topics: Vec::new(),
            recipient: Some(user),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &MarketplaceEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let recipient_match = match self.recipient {
            None => true,
            Some(user) => event.recipients().contains(&user),
        };

        topic_match && recipient_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(recipient: UserId) -> MarketplaceEvent {
        MarketplaceEvent::Notification {
            recipient,
            kind: NotificationKind::Selected,
            project: ProjectId::new(),
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        let event = MarketplaceEvent::ChatDeactivated {
            project: ProjectId::new(),
        };
        assert_eq!(event.topic(), EventTopic::Chat);
        assert_eq!(notification(UserId::new()).topic(), EventTopic::Notifications);
    }

    #[test]
    fn test_notification_label_matches_wire_name() {
        for kind in [
            NotificationKind::ApplicationReceived,
            NotificationKind::RatingPrompt,
            NotificationKind::PaymentFailed,
        ] {
            let wire = serde_json::to_string(&kind).unwrap();
            assert_eq!(wire, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&notification(UserId::new())));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Chat]);
        assert!(!filter.matches(&notification(UserId::new())));

        let chat = MarketplaceEvent::ChatActivated {
            project: ProjectId::new(),
            party_a: UserId::new(),
            party_b: UserId::new(),
        };
        assert!(filter.matches(&chat));
    }

    #[test]
    fn test_filter_by_recipient() {
        let alice = UserId::new();
        let filter = EventFilter::for_recipient(alice);

        assert!(filter.matches(&notification(alice)));
        assert!(!filter.matches(&notification(UserId::new())));

        let status = MarketplaceEvent::ProjectStatusChanged {
            project: ProjectId::new(),
            from: ProjectStatus::Draft,
            to: ProjectStatus::Open,
        };
        assert!(!filter.matches(&status));
    }

    #[test]
    fn test_notification_kind_wire_name() {
        let json = serde_json::to_string(&NotificationKind::RatingPrompt).unwrap();
        assert_eq!(json, "\"ratingPrompt\"");
    }
}
