//! # Inbound Ports
//!
//! API trait defining what the Application Registry can do.

use crate::domain::{Application, Candidate, RegistryError, SelectionOutcome};
use async_trait::async_trait;
use shared_types::{ApplicationId, ProjectId, ProjectSummary, UserId};

/// Application registry API - inbound port.
///
/// The selection primitives (`ensure_selectable`, `commit_selection`,
/// `close_pending`) are meant to run inside the caller's per-project
/// critical section.
#[async_trait]
pub trait ApplicationRegistryApi: Send + Sync {
    /// Submit (or re-submit after withdrawal) an application.
    fn apply(
        &self,
        project: &ProjectSummary,
        applicant: UserId,
        cover_letter: Option<String>,
    ) -> Result<Application, RegistryError>;

    /// Pending → Withdrawn. Any other status: returned unchanged.
    fn withdraw(&self, application: ApplicationId) -> Result<Application, RegistryError>;

    /// Pending → Rejected by the creator.
    fn reject(&self, application: ApplicationId) -> Result<Application, RegistryError>;

    /// Check that `application` is a pending application on `project`.
    fn ensure_selectable(
        &self,
        project: ProjectId,
        application: ApplicationId,
    ) -> Result<Application, RegistryError>;

    /// Mark `application` Selected and close every other pending sibling.
    fn commit_selection(
        &self,
        project: ProjectId,
        application: ApplicationId,
    ) -> Result<SelectionOutcome, RegistryError>;

    /// Close every pending application on the project.
    fn close_pending(&self, project: ProjectId) -> Vec<Application>;

    /// Pending and selected applications with applicant profiles.
    async fn list_candidates(&self, project: ProjectId) -> Result<Vec<Candidate>, RegistryError>;

    fn application(&self, application: ApplicationId) -> Option<Application>;

    fn applications_for(&self, project: ProjectId) -> Vec<Application>;
}
