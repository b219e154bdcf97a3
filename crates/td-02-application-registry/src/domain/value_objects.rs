//! # Value Objects

use serde::{Deserialize, Serialize};
use shared_types::ReputationSnapshot;

/// Application status.
///
/// ```text
///            ┌──select───→ [Selected]
///            ├──sibling selected / project cancelled──→ [Closed]
/// [Pending] ─┼──creator rejects──→ [Rejected]
///            └──applicant withdraws──→ [Withdrawn] ──re-apply──→ [Pending]
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Selected,
    Closed,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Selected)
                | (Self::Pending, Self::Closed)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Withdrawn)
                | (Self::Withdrawn, Self::Pending)
        )
    }

    /// Still in the running (or already chosen).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Selected)
    }
}

/// What the profile service knows about an applicant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub reputation: ReputationSnapshot,
    /// Projects the applicant completed as provider.
    pub completed_projects: u32,
}
