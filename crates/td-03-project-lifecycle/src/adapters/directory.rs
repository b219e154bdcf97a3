//! Project read view for the rating collector.

use crate::ports::outbound::ProjectRepository;
use shared_types::{ProjectId, ProjectSummary};
use std::sync::Arc;
use td_04_rating_collector::ProjectDirectory;

/// Serves project summaries straight from the project repository.
pub struct RepositoryDirectory {
    repository: Arc<dyn ProjectRepository>,
}

impl RepositoryDirectory {
    pub fn new(repository: Arc<dyn ProjectRepository>) -> Self {
        Self { repository }
    }
}

impl ProjectDirectory for RepositoryDirectory {
    fn summary(&self, project: ProjectId) -> Option<ProjectSummary> {
        self.repository.get(project).map(|p| p.summary())
    }
}
