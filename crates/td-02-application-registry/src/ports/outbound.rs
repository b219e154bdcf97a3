//! # Outbound Ports
//!
//! Storage and the profile service.

use crate::domain::{Application, CandidateProfile, RegistryError};
use async_trait::async_trait;
use shared_types::{ApplicationId, ProjectId, UserId};

/// Application storage - outbound port.
///
/// `(project, applicant)` is a unique key; `insert` enforces it atomically.
pub trait ApplicationRepository: Send + Sync {
    /// Store a new application. Fails with `DuplicateApplication` if the
    /// `(project, applicant)` slot is taken.
    fn insert(&self, application: Application) -> Result<(), RegistryError>;

    /// Overwrite an existing application.
    fn save(&self, application: Application) -> Result<(), RegistryError>;

    fn get(&self, id: ApplicationId) -> Option<Application>;

    fn find(&self, project: ProjectId, applicant: UserId) -> Option<Application>;

    /// All applications on a project, oldest submission first.
    fn list_by_project(&self, project: ProjectId) -> Vec<Application>;
}

/// Profile service - outbound port.
#[async_trait]
pub trait CandidateProfileSource: Send + Sync {
    async fn profile(&self, user: UserId) -> Result<CandidateProfile, RegistryError>;
}
