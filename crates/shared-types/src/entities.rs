//! # Core Domain Entities
//!
//! Identifiers and read models shared by every engine component.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, `ProjectId`, `ApplicationId`, `EscrowTxId`, `RatingId`
//! - **Money & Time**: `Amount` (minor currency units), `Timestamp` (ms)
//! - **Lifecycle**: `ProjectStatus` and its transition table, `ProjectSummary`
//! - **Reputation**: `ReputationSnapshot`

use crate::errors::IdParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Monetary amount in minor currency units (cents).
pub type Amount = u64;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| IdParseError {
                        kind: stringify!($name),
                        input: s.to_string(),
                        reason: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Identity of a marketplace user, supplied by the identity service.
    UserId
);
define_id!(
    /// Identity of a project.
    ProjectId
);
define_id!(
    /// Identity of an application to a project.
    ApplicationId
);
define_id!(
    /// Identity of an escrow transaction.
    EscrowTxId
);
define_id!(
    /// Identity of a rating.
    RatingId
);

// =============================================================================
// PROJECT STATUS
// =============================================================================

/// Project lifecycle status.
///
/// ```text
/// [Draft] ──publish──→ [Open] ──select──→ [InProgress] ──submit──→ [InReview] ──approve──→ [Completed]
///                         │                   ↑    │                  │    │
///                         │                   └────┼───revision───────┘    │
///                         └───────────cancel───────┴─────────────────────────┴──→ [Cancelled]
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// Created, not visible in the marketplace.
    #[default]
    Draft,
    /// Published and accepting applications.
    Open,
    /// Provider selected, escrow held, work underway.
    InProgress,
    /// Delivery submitted, awaiting the creator's decision.
    InReview,
    /// Delivery approved and escrow released.
    Completed,
    /// Cancelled; escrow (if any) refunded or split.
    Cancelled,
}

impl ProjectStatus {
    /// Checks the transition table. Anything not listed is rejected.
    pub fn can_transition_to(&self, next: ProjectStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Open)
                | (Self::Open, Self::InProgress)
                | (Self::InProgress, Self::InReview)
                | (Self::InReview, Self::InProgress)
                | (Self::InReview, Self::Completed)
                | (Self::Open, Self::Cancelled)
                | (Self::InProgress, Self::Cancelled)
                | (Self::InReview, Self::Cancelled)
        )
    }

    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Only open projects accept applications.
    pub fn accepts_applications(&self) -> bool {
        *self == Self::Open
    }

    /// True once a provider has been selected (whether or not the project ended).
    pub fn is_past_selection(&self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::InReview | Self::Completed | Self::Cancelled
        )
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Read model of a project handed to the registry and the rating collector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Project identity.
    pub id: ProjectId,
    /// The creator.
    pub owner: UserId,
    /// Current status.
    pub status: ProjectStatus,
    /// Selected provider, if any.
    pub provider: Option<UserId>,
}

impl ProjectSummary {
    /// Returns the counterparty of `user` on this project, if `user` is a party.
    pub fn counterparty_of(&self, user: UserId) -> Option<UserId> {
        let provider = self.provider?;
        if user == self.owner {
            Some(provider)
        } else if user == provider {
            Some(self.owner)
        } else {
            None
        }
    }
}

// =============================================================================
// REPUTATION
// =============================================================================

/// Derived reputation aggregate for one user.
///
/// Written only by the reputation guard; recomputed from rating history,
/// never incremented.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReputationSnapshot {
    /// The rated user.
    pub user: UserId,
    /// Mean of the ratings in the window; `None` when no ratings exist.
    pub average: Option<f64>,
    /// Number of ratings in the window.
    pub window_count: usize,
    /// True when the user's marketplace visibility is reduced.
    pub visibility_flag: bool,
    /// Timestamp of the newest rating in the window.
    pub newest_rating_at: Option<Timestamp>,
    /// When the snapshot was last (re)written.
    pub recomputed_at: Timestamp,
}

impl ReputationSnapshot {
    /// Snapshot for a user with no ratings.
    pub fn empty(user: UserId, now: Timestamp) -> Self {
        Self {
            user,
            average: None,
            window_count: 0,
            visibility_flag: false,
            newest_rating_at: None,
            recomputed_at: now,
        }
    }

    /// True if the derived values match, ignoring the recompute marker.
    pub fn same_values(&self, other: &Self) -> bool {
        self.user == other.user
            && self.average == other.average
            && self.window_count == other.window_count
            && self.visibility_flag == other.visibility_flag
            && self.newest_rating_at == other.newest_rating_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_edges() {
        assert!(ProjectStatus::Draft.can_transition_to(ProjectStatus::Open));
        assert!(ProjectStatus::Open.can_transition_to(ProjectStatus::InProgress));
        assert!(ProjectStatus::InProgress.can_transition_to(ProjectStatus::InReview));
        assert!(ProjectStatus::InReview.can_transition_to(ProjectStatus::Completed));
    }

    #[test]
    fn test_revision_back_edge() {
        assert!(ProjectStatus::InReview.can_transition_to(ProjectStatus::InProgress));
        assert!(!ProjectStatus::InProgress.can_transition_to(ProjectStatus::Open));
    }

    #[test]
    fn test_cancel_edges() {
        assert!(!ProjectStatus::Draft.can_transition_to(ProjectStatus::Cancelled));
        assert!(ProjectStatus::Open.can_transition_to(ProjectStatus::Cancelled));
        assert!(ProjectStatus::InProgress.can_transition_to(ProjectStatus::Cancelled));
        assert!(ProjectStatus::InReview.can_transition_to(ProjectStatus::Cancelled));
        assert!(!ProjectStatus::Completed.can_transition_to(ProjectStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        let all = [
            ProjectStatus::Draft,
            ProjectStatus::Open,
            ProjectStatus::InProgress,
            ProjectStatus::InReview,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ];
        for terminal in [ProjectStatus::Completed, ProjectStatus::Cancelled] {
            assert!(terminal.is_terminal());
            assert!(all.iter().all(|next| !terminal.can_transition_to(*next)));
        }
    }

    #[test]
    fn test_nothing_enters_draft() {
        let all = [
            ProjectStatus::Open,
            ProjectStatus::InProgress,
            ProjectStatus::InReview,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ];
        assert!(all
            .iter()
            .all(|from| !from.can_transition_to(ProjectStatus::Draft)));
    }

    #[test]
    fn test_counterparty() {
        let owner = UserId::new();
        let provider = UserId::new();
        let summary = ProjectSummary {
            id: ProjectId::new(),
            owner,
            status: ProjectStatus::Completed,
            provider: Some(provider),
        };
        assert_eq!(summary.counterparty_of(owner), Some(provider));
        assert_eq!(summary.counterparty_of(provider), Some(owner));
        assert_eq!(summary.counterparty_of(UserId::new()), None);
    }

    #[test]
    fn test_status_serde_roundtrip() {
        let json = serde_json::to_string(&ProjectStatus::InReview).unwrap();
        let back: ProjectStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProjectStatus::InReview);
    }

    #[test]
    fn test_id_parse() {
        let id = ProjectId::new();
        let parsed: ProjectId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        let err = "not-a-uuid".parse::<UserId>().unwrap_err();
        assert_eq!(err.kind, "UserId");
    }

    #[test]
    fn test_snapshot_same_values_ignores_marker() {
        let user = UserId::new();
        let a = ReputationSnapshot::empty(user, 10);
        let b = ReputationSnapshot::empty(user, 20);
        assert!(a.same_values(&b));
        assert_ne!(a, b);
    }
}
