//! In-memory application storage.

use crate::domain::{Application, RegistryError};
use crate::ports::outbound::ApplicationRepository;
use parking_lot::RwLock;
use shared_types::{ApplicationId, ProjectId, UserId};
use std::collections::HashMap;

#[derive(Default)]
struct Tables {
    by_id: HashMap<ApplicationId, Application>,
    by_slot: HashMap<(ProjectId, UserId), ApplicationId>,
}

/// Application repository backed by hash maps.
#[derive(Default)]
pub struct InMemoryApplicationRepository {
    tables: RwLock<Tables>,
}

impl InMemoryApplicationRepository {
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

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<(), RegistryError> {
        let mut tables = self.tables.write();
        let slot = (application.project, application.applicant);
        if tables.by_slot.contains_key(&slot) {
            return Err(RegistryError::DuplicateApplication {
                project: application.project,
                applicant: application.applicant,
            });
        }
        tables.by_slot.insert(slot, application.id);
        tables.by_id.insert(application.id, application);
        Ok(())
    }

    fn save(&self, application: Application) -> Result<(), RegistryError> {
        let mut tables = self.tables.write();
        match tables.by_id.get_mut(&application.id) {
            Some(existing) => {
                *existing = application;
                Ok(())
            }
            None => Err(RegistryError::ApplicationNotFound(application.id)),
        }
    }

    fn get(&self, id: ApplicationId) -> Option<Application> {
        self.tables.read().by_id.get(&id).cloned()
    }

    fn find(&self, project: ProjectId, applicant: UserId) -> Option<Application> {
        let tables = self.tables.read();
        tables
            .by_slot
            .get(&(project, applicant))
            .and_then(|id| tables.by_id.get(id))
            .cloned()
    }

    fn list_by_project(&self, project: ProjectId) -> Vec<Application> {
        let mut apps: Vec<Application> = self
            .tables
            .read()
            .by_id
            .values()
            .filter(|app| app.project == project)
            .cloned()
            .collect();
        apps.sort_by_key(|app| (app.submitted_at, app.id));
        apps
    }
}
