//! # Outbound Ports
//!
//! Storage the lifecycle depends on.

use crate::domain::{LifecycleError, Project};
use shared_types::{ProjectId, ProjectStatus, UserId};

/// Project storage.
///
/// `save` is a compare-and-swap: it succeeds only when the stored version
/// equals `project.version`, and returns the project with the bumped version.
pub trait ProjectRepository: Send + Sync {
    /// Store a new project. Fails if the id is taken.
    fn insert(&self, project: Project) -> Result<Project, LifecycleError>;

    fn get(&self, id: ProjectId) -> Option<Project>;

    fn save(&self, project: Project) -> Result<Project, LifecycleError>;

    /// Projects in the given status, oldest first.
    fn list_by_status(&self, status: ProjectStatus) -> Vec<Project>;

    /// Completed projects on which `provider` was the selected provider.
    fn count_completed_for_provider(&self, provider: UserId) -> u32;
}
