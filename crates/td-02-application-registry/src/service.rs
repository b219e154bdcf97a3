//! # Application Registry Service

use crate::config::RegistryConfig;
use crate::domain::{
    invariant_can_apply, invariant_single_selection, Application, ApplicationStatus, Candidate,
    RegistryError, SelectionOutcome,
};
use crate::ports::{ApplicationRegistryApi, ApplicationRepository, CandidateProfileSource};
use async_trait::async_trait;
use shared_types::{ApplicationId, ProjectId, ProjectSummary, TimeSource, UserId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The application registry.
pub struct ApplicationRegistry {
    config: RegistryConfig,
    repository: Arc<dyn ApplicationRepository>,
    profiles: Arc<dyn CandidateProfileSource>,
    time: Arc<dyn TimeSource>,
}

impl ApplicationRegistry {
    pub fn new(
        config: RegistryConfig,
        repository: Arc<dyn ApplicationRepository>,
        profiles: Arc<dyn CandidateProfileSource>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            repository,
            profiles,
            time,
        }
    }

    fn load(&self, id: ApplicationId) -> Result<Application, RegistryError> {
        self.repository
            .get(id)
            .ok_or(RegistryError::ApplicationNotFound(id))
    }

    fn check_cover_letter(&self, cover_letter: Option<&str>) -> Result<(), RegistryError> {
        let len = cover_letter.map_or(0, |text| text.chars().count());
        if len > self.config.max_cover_letter_chars {
            return Err(RegistryError::CoverLetterTooLong {
                len,
                max: self.config.max_cover_letter_chars,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationRegistryApi for ApplicationRegistry {
    fn apply(
        &self,
        project: &ProjectSummary,
        applicant: UserId,
        cover_letter: Option<String>,
    ) -> Result<Application, RegistryError> {
        let existing = self.repository.find(project.id, applicant);
        invariant_can_apply(project, applicant, existing.as_ref())?;
        self.check_cover_letter(cover_letter.as_deref())?;

        let now = self.time.now();
        let application = match existing {
            Some(mut withdrawn) => {
                withdrawn.resubmit(cover_letter, now)?;
                self.repository.save(withdrawn.clone())?;
                withdrawn
            }
            None => {
                let application = Application::new(project.id, applicant, cover_letter, now);
                self.repository.insert(application.clone())?;
                application
            }
        };

        info!(
            project = %project.id,
            application = %application.id,
            applicant = %applicant,
            "Application submitted"
        );
        Ok(application)
    }

    fn withdraw(&self, id: ApplicationId) -> Result<Application, RegistryError> {
        let mut application = self.load(id)?;
        if application.status != ApplicationStatus::Pending {
            debug!(application = %id, status = ?application.status, "Withdraw ignored");
            return Ok(application);
        }

        application.transition_to(ApplicationStatus::Withdrawn, self.time.now())?;
        self.repository.save(application.clone())?;
        info!(project = %application.project, application = %id, "Application withdrawn");
        Ok(application)
    }

    fn reject(&self, id: ApplicationId) -> Result<Application, RegistryError> {
        let mut application = self.load(id)?;
        application.transition_to(ApplicationStatus::Rejected, self.time.now())?;
        self.repository.save(application.clone())?;
        info!(project = %application.project, application = %id, "Application rejected");
        Ok(application)
    }

    fn ensure_selectable(
        &self,
        project: ProjectId,
        id: ApplicationId,
    ) -> Result<Application, RegistryError> {
        let application = self.load(id)?;
        if application.project != project {
            return Err(RegistryError::ApplicationProjectMismatch {
                application: id,
                project,
            });
        }
        if application.status != ApplicationStatus::Pending {
            warn!(application = %id, status = ?application.status, "Applicant unavailable");
            return Err(RegistryError::ApplicantUnavailable {
                application: id,
                status: application.status,
            });
        }
        Ok(application)
    }

    fn commit_selection(
        &self,
        project: ProjectId,
        id: ApplicationId,
    ) -> Result<SelectionOutcome, RegistryError> {
        let mut selected = self.ensure_selectable(project, id)?;
        let now = self.time.now();

        selected.transition_to(ApplicationStatus::Selected, now)?;
        self.repository.save(selected.clone())?;

        let mut closed = Vec::new();
        for mut sibling in self.repository.list_by_project(project) {
            if sibling.id == id || sibling.status != ApplicationStatus::Pending {
                continue;
            }
            sibling.transition_to(ApplicationStatus::Closed, now)?;
            self.repository.save(sibling.clone())?;
            closed.push(sibling);
        }

        debug_assert!(invariant_single_selection(
            &self.repository.list_by_project(project)
        ));
        info!(
            project = %project,
            application = %id,
            closed = closed.len(),
            "Selection committed"
        );
        Ok(SelectionOutcome { selected, closed })
    }

    fn close_pending(&self, project: ProjectId) -> Vec<Application> {
        let now = self.time.now();
        let mut closed = Vec::new();
        for mut application in self.repository.list_by_project(project) {
            if application.status != ApplicationStatus::Pending {
                continue;
            }
            if let Err(e) = application.transition_to(ApplicationStatus::Closed, now) {
                warn!(application = %application.id, error = %e, "Pending application not closed");
                continue;
            }
            match self.repository.save(application.clone()) {
                Ok(()) => closed.push(application),
                Err(e) => {
                    warn!(application = %application.id, error = %e, "Closed application not saved")
                }
            }
        }
        if !closed.is_empty() {
            info!(project = %project, closed = closed.len(), "Pending applications closed");
        }
        closed
    }

    async fn list_candidates(&self, project: ProjectId) -> Result<Vec<Candidate>, RegistryError> {
        let active: Vec<Application> = self
            .repository
            .list_by_project(project)
            .into_iter()
            .filter(|app| app.status.is_active())
            .collect();

        let mut candidates = Vec::with_capacity(active.len());
        for application in active {
            let profile = self.profiles.profile(application.applicant).await?;
            candidates.push(Candidate {
                application,
                profile,
            });
        }
        Ok(candidates)
    }

    fn application(&self, id: ApplicationId) -> Option<Application> {
        self.repository.get(id)
    }

    fn applications_for(&self, project: ProjectId) -> Vec<Application> {
        self.repository.list_by_project(project)
    }
}
