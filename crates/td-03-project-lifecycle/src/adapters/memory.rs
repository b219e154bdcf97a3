//! In-memory project storage with version-checked saves.

use crate::domain::{LifecycleError, Project};
use crate::ports::outbound::ProjectRepository;
use parking_lot::RwLock;
use shared_types::{ProjectId, ProjectStatus, UserId};
use std::collections::HashMap;

#[derive(Default)]
struct Tables {
    by_id: HashMap<ProjectId, Project>,
    /// Insertion order for listings.
    order: Vec<ProjectId>,
}

/// Project repository backed by a hash map.
#[derive(Default)]
pub struct InMemoryProjectRepository {
    tables: RwLock<Tables>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert(&self, project: Project) -> Result<Project, LifecycleError> {
        let mut tables = self.tables.write();
        if tables.by_id.contains_key(&project.id) {
            return Err(LifecycleError::DuplicateProject(project.id));
        }
        tables.order.push(project.id);
        tables.by_id.insert(project.id, project.clone());
        Ok(project)
    }

    fn get(&self, id: ProjectId) -> Option<Project> {
        self.tables.read().by_id.get(&id).cloned()
    }

    fn save(&self, mut project: Project) -> Result<Project, LifecycleError> {
        let mut tables = self.tables.write();
        let stored = tables
            .by_id
            .get_mut(&project.id)
            .ok_or(LifecycleError::ProjectNotFound(project.id))?;
        if stored.version != project.version {
            return Err(LifecycleError::ConcurrentModification {
                project: project.id,
                expected: project.version,
                found: stored.version,
            });
        }
        project.version += 1;
        *stored = project.clone();
        Ok(project)
    }

    fn list_by_status(&self, status: ProjectStatus) -> Vec<Project> {
        let tables = self.tables.read();
        tables
            .order
            .iter()
            .filter_map(|id| tables.by_id.get(id))
            .filter(|p| p.status == status)
            .cloned()
            .collect()
    }

    fn count_completed_for_provider(&self, provider: UserId) -> u32 {
        let count = self
            .tables
            .read()
            .by_id
            .values()
            .filter(|p| p.status == ProjectStatus::Completed && p.provider == Some(provider))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
