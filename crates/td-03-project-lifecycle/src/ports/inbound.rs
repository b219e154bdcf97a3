//! # Inbound Ports
//!
//! API trait defining what the Project Lifecycle can do.

use crate::domain::{DisputeSettlement, LifecycleError, Project, ProjectDraft};
use async_trait::async_trait;
use shared_types::{ApplicationId, ProjectId, UserId};
use td_02_application_registry::{Application, Candidate};

/// Project lifecycle API - inbound port.
///
/// Every mutating operation runs inside the project's critical section, held
/// for the whole read-decide-act cycle including escrow calls.
#[async_trait]
pub trait ProjectLifecycleApi: Send + Sync {
    /// Create a Draft project.
    async fn create_project(&self, draft: ProjectDraft) -> Result<Project, LifecycleError>;

    /// Draft → Open.
    async fn publish(&self, project: ProjectId) -> Result<Project, LifecycleError>;

    /// Apply to an open project.
    async fn apply(
        &self,
        project: ProjectId,
        applicant: UserId,
        cover_letter: Option<String>,
    ) -> Result<Application, LifecycleError>;

    async fn withdraw_application(
        &self,
        application: ApplicationId,
    ) -> Result<Application, LifecycleError>;

    async fn reject_application(
        &self,
        application: ApplicationId,
    ) -> Result<Application, LifecycleError>;

    async fn list_candidates(&self, project: ProjectId) -> Result<Vec<Candidate>, LifecycleError>;

    /// Open → InProgress: hold escrow, select one applicant, close the rest.
    async fn select_applicant(
        &self,
        project: ProjectId,
        application: ApplicationId,
    ) -> Result<Project, LifecycleError>;

    /// InProgress → InReview.
    async fn submit_delivery(&self, project: ProjectId) -> Result<Project, LifecycleError>;

    /// InReview → InProgress.
    async fn request_revision(&self, project: ProjectId) -> Result<Project, LifecycleError>;

    /// InReview → Completed: release escrow and prompt both ratings.
    async fn approve(&self, project: ProjectId) -> Result<Project, LifecycleError>;

    /// {Open, InProgress, InReview} → Cancelled with a full refund.
    async fn cancel(&self, project: ProjectId, reason: String) -> Result<Project, LifecycleError>;

    /// {InProgress, InReview} → Cancelled with the escrow split.
    async fn settle_dispute(
        &self,
        project: ProjectId,
        settlement: DisputeSettlement,
    ) -> Result<Project, LifecycleError>;

    fn project(&self, project: ProjectId) -> Option<Project>;

    /// Projects accepting applications.
    fn open_projects(&self) -> Vec<Project>;
}
