//! # Project Lifecycle Service
//!
//! Drives projects through the status table. Each mutating operation takes
//! the project's lock, reads the project, decides, calls out (registry,
//! escrow), saves with a version check, then publishes events.
//!
//! Lock order is project then escrow: the ledger's own per-project lock is
//! only ever taken while this service already holds the project lock.

use crate::config::LifecycleConfig;
use crate::domain::{
    invariant_selection_consistency, invariant_valid_listing, normalize_skills,
    DisputeSettlement, LifecycleError, Project, ProjectDraft,
};
use crate::ports::{ProjectLifecycleApi, ProjectRepository};
use async_trait::async_trait;
use shared_bus::{EventPublisher, MarketplaceEvent, NotificationKind};
use shared_types::{
    Amount, ApplicationId, KeyedLocks, ProjectId, ProjectStatus, TimeSource, UserId,
};
use std::sync::Arc;
use td_01_escrow_ledger::{EscrowError, EscrowLedgerApi, EscrowState};
use td_02_application_registry::{
    Application, ApplicationRegistryApi, Candidate, RegistryError,
};
use td_04_rating_collector::RatingCollectorApi;
use tracing::{debug, error, info, warn};

/// Collaborators of the lifecycle service.
pub struct LifecycleDependencies {
    pub repository: Arc<dyn ProjectRepository>,
    pub registry: Arc<dyn ApplicationRegistryApi>,
    pub ledger: Arc<dyn EscrowLedgerApi>,
    pub ratings: Arc<dyn RatingCollectorApi>,
    pub publisher: Arc<dyn EventPublisher>,
    pub time: Arc<dyn TimeSource>,
}

/// The project lifecycle state machine.
pub struct ProjectLifecycleService {
    config: LifecycleConfig,
    repository: Arc<dyn ProjectRepository>,
    registry: Arc<dyn ApplicationRegistryApi>,
    ledger: Arc<dyn EscrowLedgerApi>,
    ratings: Arc<dyn RatingCollectorApi>,
    publisher: Arc<dyn EventPublisher>,
    time: Arc<dyn TimeSource>,
    locks: KeyedLocks<ProjectId>,
}

impl ProjectLifecycleService {
    pub fn new(config: LifecycleConfig, deps: LifecycleDependencies) -> Self {
        Self {
            config,
            repository: deps.repository,
            registry: deps.registry,
            ledger: deps.ledger,
            ratings: deps.ratings,
            publisher: deps.publisher,
            time: deps.time,
            locks: KeyedLocks::new(),
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Drop lock entries no operation is waiting on.
    pub fn prune_locks(&self) -> usize {
        self.locks.prune()
    }

    fn load(&self, id: ProjectId) -> Result<Project, LifecycleError> {
        self.repository
            .get(id)
            .ok_or(LifecycleError::ProjectNotFound(id))
    }

    fn persist(&self, project: Project) -> Result<Project, LifecycleError> {
        invariant_selection_consistency(&project)?;
        self.repository.save(project)
    }

    fn application_project(&self, application: ApplicationId) -> Result<ProjectId, LifecycleError> {
        self.registry
            .application(application)
            .map(|app| app.project)
            .ok_or_else(|| RegistryError::ApplicationNotFound(application).into())
    }

    async fn notify(&self, recipient: UserId, kind: NotificationKind, project: ProjectId) {
        self.publisher
            .publish(MarketplaceEvent::Notification {
                recipient,
                kind,
                project,
            })
            .await;
    }

    async fn announce(&self, project: &Project, from: ProjectStatus) {
        info!(
            project = %project.id,
            from = %from,
            to = %project.status,
            version = project.version,
            "Project transitioned"
        );
        self.publisher
            .publish(MarketplaceEvent::ProjectStatusChanged {
                project: project.id,
                from,
                to: project.status,
            })
            .await;
    }

    /// Chat closes when a project with a provider reaches a terminal state.
    async fn deactivate_chat(&self, project: &Project) {
        if project.provider.is_some() {
            self.publisher
                .publish(MarketplaceEvent::ChatDeactivated {
                    project: project.id,
                })
                .await;
        }
    }

    /// Processor-level failures are reported to the creator.
    async fn escrow_failed(&self, project: &Project, err: EscrowError) -> LifecycleError {
        if err.is_processor_failure() {
            self.notify(project.owner, NotificationKind::PaymentFailed, project.id)
                .await;
        }
        err.into()
    }

    /// A hold succeeded but the selection could not be completed.
    async fn compensate_hold(&self, project: ProjectId, cause: LifecycleError) -> LifecycleError {
        error!(project = %project, error = %cause, "Selection not committed, refunding hold");
        match self.ledger.refund(project).await {
            Ok(_) => cause,
            Err(refund) => {
                error!(project = %project, error = %refund, "Compensating refund failed");
                LifecycleError::HoldNotCompensated {
                    project,
                    cause: cause.to_string(),
                    refund,
                }
            }
        }
    }

    /// Refund a Held transaction the project does not point at, left behind
    /// by a failed compensation. Caller holds the project lock.
    async fn refund_orphaned_hold(&self, project: &Project) -> Result<Amount, EscrowError> {
        let orphaned = project.escrow_tx.is_none()
            && self
                .ledger
                .transaction(project.id)
                .is_some_and(|tx| tx.state == EscrowState::Held);
        if !orphaned {
            return Ok(0);
        }
        let tx = self.ledger.refund(project.id).await?;
        warn!(project = %project.id, tx = %tx.id, amount = tx.refunded_amount, "Orphaned hold refunded");
        Ok(tx.refunded_amount)
    }

    /// Everything the creator may have been charged for a project that never
    /// got a provider: an orphaned hold, and a capture left in doubt.
    async fn settle_unclaimed_escrow(&self, project: &Project) -> Result<Amount, EscrowError> {
        let mut returned = self.refund_orphaned_hold(project).await?;
        if let Some(tx) = self.ledger.void_in_doubt(project.id).await? {
            returned += tx.refunded_amount;
        }
        Ok(returned)
    }

    async fn run_publish(&self, id: ProjectId) -> Result<Project, LifecycleError> {
        let _guard = self.locks.lock(&id).await;
        let mut project = self.load(id)?;
        project.transition_from(ProjectStatus::Draft, ProjectStatus::Open, self.time.now())?;
        let project = self.persist(project)?;
        self.announce(&project, ProjectStatus::Draft).await;
        Ok(project)
    }

    async fn run_apply(
        &self,
        id: ProjectId,
        applicant: UserId,
        cover_letter: Option<String>,
    ) -> Result<Application, LifecycleError> {
        let _guard = self.locks.lock(&id).await;
        let project = self.load(id)?;
        let application = self
            .registry
            .apply(&project.summary(), applicant, cover_letter)?;
        self.notify(project.owner, NotificationKind::ApplicationReceived, id)
            .await;
        Ok(application)
    }

    async fn run_select(
        &self,
        id: ProjectId,
        application: ApplicationId,
    ) -> Result<Project, LifecycleError> {
        let _guard = self.locks.lock(&id).await;
        let project = self.load(id)?;
        match project.status {
            ProjectStatus::Open => {}
            ProjectStatus::Draft => {
                return Err(LifecycleError::InvalidTransition {
                    project: id,
                    from: ProjectStatus::Draft,
                    to: ProjectStatus::InProgress,
                })
            }
            status => return Err(LifecycleError::AlreadySelected { project: id, status }),
        }
        let candidate = self.registry.ensure_selectable(id, application)?;
        if let Err(e) = self.refund_orphaned_hold(&project).await {
            return Err(self.escrow_failed(&project, e).await);
        }

        let escrow = match self
            .ledger
            .hold(id, project.owner, candidate.applicant, project.budget)
            .await
        {
            Ok(tx) => tx,
            Err(e) => return Err(self.escrow_failed(&project, e).await),
        };

        let mut selected = project;
        let saved = selected
            .assign_provider(candidate.id, candidate.applicant, escrow.id, self.time.now())
            .and_then(|()| self.persist(selected));
        let project = match saved {
            Ok(p) => p,
            Err(e) => return Err(self.compensate_hold(id, e).await),
        };

        let outcome = match self.registry.commit_selection(id, candidate.id) {
            Ok(outcome) => outcome,
            Err(e) => {
                let mut reverted = project;
                reverted.undo_selection();
                if let Err(save_err) = self.persist(reverted) {
                    error!(project = %id, error = %save_err, "Failed to revert selection");
                }
                return Err(self.compensate_hold(id, e.into()).await);
            }
        };

        self.announce(&project, ProjectStatus::Open).await;
        self.publisher
            .publish(MarketplaceEvent::ChatActivated {
                project: id,
                party_a: project.owner,
                party_b: candidate.applicant,
            })
            .await;
        self.notify(candidate.applicant, NotificationKind::Selected, id)
            .await;
        for closed in &outcome.closed {
            self.notify(closed.applicant, NotificationKind::ApplicationClosed, id)
                .await;
        }
        self.notify(project.owner, NotificationKind::PaymentHeld, id)
            .await;

        info!(
            project = %id,
            provider = %candidate.applicant,
            escrow = %escrow.id,
            amount = escrow.held_amount,
            closed = outcome.closed.len(),
            "Applicant selected"
        );
        Ok(project)
    }

    /// Transitions that touch neither escrow nor applications.
    async fn run_simple_transition(
        &self,
        id: ProjectId,
        from: ProjectStatus,
        next: ProjectStatus,
    ) -> Result<Project, LifecycleError> {
        let _guard = self.locks.lock(&id).await;
        let mut project = self.load(id)?;
        project.transition_from(from, next, self.time.now())?;
        let project = self.persist(project)?;
        self.announce(&project, from).await;

        match (next, project.provider) {
            (ProjectStatus::InReview, _) => {
                self.notify(project.owner, NotificationKind::DeliverySubmitted, id)
                    .await
            }
            (ProjectStatus::InProgress, Some(provider)) => {
                self.notify(provider, NotificationKind::RevisionRequested, id)
                    .await
            }
            _ => {}
        }
        Ok(project)
    }

    async fn run_approve(&self, id: ProjectId) -> Result<Project, LifecycleError> {
        let _guard = self.locks.lock(&id).await;
        let mut project = self.load(id)?;
        let from = project.status;
        project.ensure_can_transition(ProjectStatus::Completed)?;

        let escrow = match self.ledger.release(id).await {
            Ok(tx) => tx,
            Err(e) => return Err(self.escrow_failed(&project, e).await),
        };
        project.transition_to(ProjectStatus::Completed, self.time.now())?;
        let project = self.persist(project).inspect_err(|e| {
            error!(project = %id, error = %e, "Escrow released but project not saved")
        })?;

        self.announce(&project, from).await;
        self.deactivate_chat(&project).await;
        for party in project.parties() {
            self.notify(party, NotificationKind::Completed, id).await;
        }
        if let Some(provider) = project.provider {
            self.notify(provider, NotificationKind::PaymentReleased, id)
                .await;
        }
        info!(project = %id, released = escrow.released_amount, "Project completed");

        if let Err(e) = self.ratings.prompt_ratings(id).await {
            warn!(project = %id, error = %e, "Rating prompts not issued");
        }
        Ok(project)
    }

    async fn run_cancel(&self, id: ProjectId, reason: String) -> Result<Project, LifecycleError> {
        let _guard = self.locks.lock(&id).await;
        let mut project = self.load(id)?;
        let from = project.status;
        project.ensure_can_transition(ProjectStatus::Cancelled)?;

        let refunded = match project.escrow_tx {
            Some(_) => self.ledger.refund(id).await.map(|tx| tx.refunded_amount),
            None => self.settle_unclaimed_escrow(&project).await,
        };
        let refunded = match refunded {
            Ok(amount) => amount,
            Err(e) => return Err(self.escrow_failed(&project, e).await),
        };
        project.cancel(reason, self.time.now())?;
        let project = self.persist(project)?;
        let closed = if from == ProjectStatus::Open {
            self.registry.close_pending(id)
        } else {
            Vec::new()
        };

        self.announce(&project, from).await;
        self.deactivate_chat(&project).await;
        for party in project.parties() {
            self.notify(party, NotificationKind::Cancelled, id).await;
        }
        for app in &closed {
            self.notify(app.applicant, NotificationKind::ApplicationClosed, id)
                .await;
        }
        if refunded > 0 {
            self.notify(project.owner, NotificationKind::PaymentRefunded, id)
                .await;
            debug!(project = %id, refunded, "Escrow refunded");
        }
        info!(
            project = %id,
            reason = project.cancellation_reason.as_deref().unwrap_or_default(),
            closed = closed.len(),
            "Project cancelled"
        );
        Ok(project)
    }

    async fn run_settle(
        &self,
        id: ProjectId,
        settlement: DisputeSettlement,
    ) -> Result<Project, LifecycleError> {
        let _guard = self.locks.lock(&id).await;
        let mut project = self.load(id)?;
        let from = project.status;
        project.ensure_can_transition(ProjectStatus::Cancelled)?;
        if project.escrow_tx.is_none() {
            return Err(EscrowError::NoEscrow(id).into());
        }

        if let Err(e) = self
            .ledger
            .partial_release(id, settlement.provider_share, settlement.creator_share)
            .await
        {
            return Err(self.escrow_failed(&project, e).await);
        }
        project.cancel(settlement.reason, self.time.now())?;
        let project = self.persist(project)?;

        self.announce(&project, from).await;
        self.deactivate_chat(&project).await;
        for party in project.parties() {
            self.notify(party, NotificationKind::Cancelled, id).await;
        }
        if let Some(provider) = project.provider.filter(|_| settlement.provider_share > 0) {
            self.notify(provider, NotificationKind::PaymentReleased, id)
                .await;
        }
        if settlement.creator_share > 0 {
            self.notify(project.owner, NotificationKind::PaymentRefunded, id)
                .await;
        }
        info!(
            project = %id,
            provider_share = settlement.provider_share,
            creator_share = settlement.creator_share,
            "Dispute settled"
        );
        Ok(project)
    }
}

fn rejected(op: &'static str, project: ProjectId, err: &LifecycleError) {
    warn!(project = %project, op, error = %err, "Lifecycle operation rejected");
}

#[async_trait]
impl ProjectLifecycleApi for ProjectLifecycleService {
    async fn create_project(&self, draft: ProjectDraft) -> Result<Project, LifecycleError> {
        invariant_valid_listing(&draft.title, draft.budget, &self.config)?;
        let draft = ProjectDraft {
            title: draft.title.trim().to_string(),
            required_skills: normalize_skills(draft.required_skills),
            ..draft
        };
        let project = self
            .repository
            .insert(Project::new(draft, self.time.now()))?;
        info!(
            project = %project.id,
            owner = %project.owner,
            budget = project.budget,
            "Project created"
        );
        Ok(project)
    }

    async fn publish(&self, project: ProjectId) -> Result<Project, LifecycleError> {
        self.run_publish(project)
            .await
            .inspect_err(|e| rejected("publish", project, e))
    }

    async fn apply(
        &self,
        project: ProjectId,
        applicant: UserId,
        cover_letter: Option<String>,
    ) -> Result<Application, LifecycleError> {
        self.run_apply(project, applicant, cover_letter)
            .await
            .inspect_err(|e| rejected("apply", project, e))
    }

    async fn withdraw_application(
        &self,
        application: ApplicationId,
    ) -> Result<Application, LifecycleError> {
        let project = self.application_project(application)?;
        let _guard = self.locks.lock(&project).await;
        Ok(self.registry.withdraw(application)?)
    }

    async fn reject_application(
        &self,
        application: ApplicationId,
    ) -> Result<Application, LifecycleError> {
        let project = self.application_project(application)?;
        let _guard = self.locks.lock(&project).await;
        let rejected_app = self
            .registry
            .reject(application)
            .inspect_err(|e| warn!(application = %application, error = %e, "Rejection refused"))?;
        self.notify(rejected_app.applicant, NotificationKind::ApplicationClosed, project)
            .await;
        Ok(rejected_app)
    }

    async fn list_candidates(&self, project: ProjectId) -> Result<Vec<Candidate>, LifecycleError> {
        self.load(project)?;
        Ok(self.registry.list_candidates(project).await?)
    }

    async fn select_applicant(
        &self,
        project: ProjectId,
        application: ApplicationId,
    ) -> Result<Project, LifecycleError> {
        self.run_select(project, application)
            .await
            .inspect_err(|e| rejected("select_applicant", project, e))
    }

    async fn submit_delivery(&self, project: ProjectId) -> Result<Project, LifecycleError> {
        self.run_simple_transition(project, ProjectStatus::InProgress, ProjectStatus::InReview)
            .await
            .inspect_err(|e| rejected("submit_delivery", project, e))
    }

    async fn request_revision(&self, project: ProjectId) -> Result<Project, LifecycleError> {
        self.run_simple_transition(project, ProjectStatus::InReview, ProjectStatus::InProgress)
            .await
            .inspect_err(|e| rejected("request_revision", project, e))
    }

    async fn approve(&self, project: ProjectId) -> Result<Project, LifecycleError> {
        self.run_approve(project)
            .await
            .inspect_err(|e| rejected("approve", project, e))
    }

    async fn cancel(&self, project: ProjectId, reason: String) -> Result<Project, LifecycleError> {
        self.run_cancel(project, reason)
            .await
            .inspect_err(|e| rejected("cancel", project, e))
    }

    async fn settle_dispute(
        &self,
        project: ProjectId,
        settlement: DisputeSettlement,
    ) -> Result<Project, LifecycleError> {
        self.run_settle(project, settlement)
            .await
            .inspect_err(|e| rejected("settle_dispute", project, e))
    }

    fn project(&self, project: ProjectId) -> Option<Project> {
        self.repository.get(project)
    }

    fn open_projects(&self) -> Vec<Project> {
        self.repository.list_by_status(ProjectStatus::Open)
    }
}
