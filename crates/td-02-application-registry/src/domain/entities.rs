//! # Domain Entities

use super::errors::RegistryError;
use super::value_objects::{ApplicationStatus, CandidateProfile};
use serde::{Deserialize, Serialize};
use shared_types::{ApplicationId, ProjectId, Timestamp, UserId};

/// An applicant's bid for a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub project: ProjectId,
    pub applicant: UserId,
    pub cover_letter: Option<String>,
    pub submitted_at: Timestamp,
    pub updated_at: Timestamp,
    pub status: ApplicationStatus,
}

impl Application {
    pub fn new(
        project: ProjectId,
        applicant: UserId,
        cover_letter: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            project,
            applicant,
            cover_letter,
            submitted_at: now,
            updated_at: now,
            status: ApplicationStatus::Pending,
        }
    }

    pub fn is_withdrawn(&self) -> bool {
        self.status == ApplicationStatus::Withdrawn
    }

    /// Transition to new status.
    pub fn transition_to(
        &mut self,
        next: ApplicationStatus,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if !self.status.can_transition_to(next) {
            return Err(RegistryError::InvalidApplicationState {
                from: format!("{:?}", self.status),
                to: format!("{:?}", next),
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Re-open a withdrawn application with a fresh cover letter.
    pub fn resubmit(
        &mut self,
        cover_letter: Option<String>,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.transition_to(ApplicationStatus::Pending, now)?;
        self.cover_letter = cover_letter;
        self.submitted_at = now;
        Ok(())
    }
}

/// An application as shown to the creator when choosing a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub application: Application,
    pub profile: CandidateProfile,
}

/// Result of a committed selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub selected: Application,
    /// Siblings closed by the selection.
    pub closed: Vec<Application>,
}
