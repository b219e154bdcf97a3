//! # Domain Invariants
//!
//! Admission and selection rules.

use super::entities::Application;
use super::errors::RegistryError;
use super::value_objects::ApplicationStatus;
use shared_types::{ProjectSummary, UserId};

/// Invariant: applications are admitted only to Open projects, never from
/// the project's owner, and at most one live application per applicant.
pub fn invariant_can_apply(
    project: &ProjectSummary,
    applicant: UserId,
    existing: Option<&Application>,
) -> Result<(), RegistryError> {
    if existing.is_some_and(|app| !app.is_withdrawn()) {
        return Err(RegistryError::DuplicateApplication {
            project: project.id,
            applicant,
        });
    }
    if !project.status.accepts_applications() {
        return Err(RegistryError::ProjectNotOpen {
            project: project.id,
            status: project.status,
        });
    }
    if applicant == project.owner {
        return Err(RegistryError::SelfApplication(project.id));
    }
    Ok(())
}

/// Invariant: at most one selected application per project.
pub fn invariant_single_selection(applications: &[Application]) -> bool {
    applications
        .iter()
        .filter(|app| app.status == ApplicationStatus::Selected)
        .count()
        <= 1
}
