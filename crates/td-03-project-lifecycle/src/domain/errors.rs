//! # Domain Errors
//!
//! Error types for the Project Lifecycle.

use shared_types::{Amount, ProjectId, ProjectStatus};
use td_01_escrow_ledger::EscrowError;
use td_02_application_registry::RegistryError;
use thiserror::Error;

/// Lifecycle error types.
///
/// Every failure is scoped to one operation; none leaves a project
/// half-transitioned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The status table has no such edge.
    #[error("Invalid transition on project {project}: {from} -> {to}")]
    InvalidTransition {
        /// Project
        project: ProjectId,
        /// Current status
        from: ProjectStatus,
        /// Attempted status
        to: ProjectStatus,
    },

    /// A provider was already selected.
    #[error("Project {project} already has a provider (status: {status})")]
    AlreadySelected {
        /// Project
        project: ProjectId,
        /// Current status
        status: ProjectStatus,
    },

    /// Project not found.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Optimistic version check failed on save.
    #[error("Concurrent modification of project {project}: expected version {expected}, found {found}")]
    ConcurrentModification {
        /// Project
        project: ProjectId,
        /// Version the writer read
        expected: u64,
        /// Version in storage
        found: u64,
    },

    /// Budget below the configured minimum.
    #[error("Invalid budget: {0}")]
    InvalidBudget(Amount),

    /// Empty or over-long title.
    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    /// Project already exists in storage.
    #[error("Project already exists: {0}")]
    DuplicateProject(ProjectId),

    /// Selected-provider and escrow fields disagree.
    #[error("Invariant violated on project {project}: {detail}")]
    InvariantViolation {
        /// Project
        project: ProjectId,
        /// What was inconsistent
        detail: String,
    },

    /// A selection was abandoned after its hold and the compensating refund
    /// failed. The next selection or cancel on the project retries it.
    #[error("Selection on project {project} abandoned ({cause}) and hold not refunded: {refund}")]
    HoldNotCompensated {
        /// Project
        project: ProjectId,
        /// Why the selection was abandoned
        cause: String,
        /// Why the refund failed
        refund: EscrowError,
    },

    /// Escrow ledger failure.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// Application registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl LifecycleError {
    /// True when the caller lost a race and may re-read and retry.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadySelected { .. }
                | Self::ConcurrentModification { .. }
                | Self::Escrow(EscrowError::EscrowAlreadyHeld(_))
                | Self::Registry(RegistryError::ApplicantUnavailable { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_classification() {
        let project = ProjectId::new();
        assert!(LifecycleError::AlreadySelected {
            project,
            status: ProjectStatus::InProgress
        }
        .is_conflict());
        assert!(LifecycleError::ConcurrentModification {
            project,
            expected: 1,
            found: 2
        }
        .is_conflict());
        assert!(!LifecycleError::InvalidTransition {
            project,
            from: ProjectStatus::Draft,
            to: ProjectStatus::Completed
        }
        .is_conflict());
        assert!(!LifecycleError::from(EscrowError::NoEscrow(project)).is_conflict());
    }

    #[test]
    fn test_wrapped_errors_display_transparently() {
        let project = ProjectId::new();
        let err = LifecycleError::from(EscrowError::NoEscrow(project));
        assert_eq!(err.to_string(), format!("No escrow for project {}", project));
    }
}
