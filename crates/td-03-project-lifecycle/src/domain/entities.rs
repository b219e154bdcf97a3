//! # Domain Entities
//!
//! The project aggregate. Status changes go through [`Project::transition_to`],
//! which enforces the status table and stamps the matching timestamp.

use super::errors::LifecycleError;
use super::value_objects::ProjectDraft;
use serde::{Deserialize, Serialize};
use shared_types::{
    Amount, ApplicationId, EscrowTxId, ProjectId, ProjectStatus, ProjectSummary, Timestamp,
    UserId,
};
use std::collections::BTreeSet;

/// A task published by a creator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub budget: Amount,
    pub status: ProjectStatus,
    pub required_skills: BTreeSet<String>,
    pub created_at: Timestamp,
    pub published_at: Option<Timestamp>,
    pub selected_at: Option<Timestamp>,
    /// Most recent delivery submission.
    pub delivered_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub selected_application: Option<ApplicationId>,
    /// The selected provider.
    pub provider: Option<UserId>,
    pub escrow_tx: Option<EscrowTxId>,
    pub cancellation_reason: Option<String>,
    pub revision_count: u32,
    /// Optimistic concurrency counter, bumped by every save.
    pub version: u64,
}

impl Project {
    pub fn new(draft: ProjectDraft, now: Timestamp) -> Self {
        Self {
            id: ProjectId::new(),
            owner: draft.owner,
            title: draft.title,
            description: draft.description,
            budget: draft.budget,
            status: ProjectStatus::Draft,
            required_skills: draft.required_skills,
            created_at: now,
            published_at: None,
            selected_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            selected_application: None,
            provider: None,
            escrow_tx: None,
            cancellation_reason: None,
            revision_count: 0,
            version: 0,
        }
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id,
            owner: self.owner,
            status: self.status,
            provider: self.provider,
        }
    }

    /// Fails without mutating when the status table has no such edge.
    pub fn ensure_can_transition(&self, next: ProjectStatus) -> Result<(), LifecycleError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                project: self.id,
                from: self.status,
                to: next,
            })
        }
    }

    pub fn transition_to(
        &mut self,
        next: ProjectStatus,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        self.ensure_can_transition(next)?;
        match next {
            ProjectStatus::Open => self.published_at = Some(now),
            ProjectStatus::InProgress if self.status == ProjectStatus::Open => {
                self.selected_at = Some(now)
            }
            ProjectStatus::InProgress => self.revision_count += 1,
            ProjectStatus::InReview => self.delivered_at = Some(now),
            ProjectStatus::Completed => self.completed_at = Some(now),
            ProjectStatus::Cancelled => self.cancelled_at = Some(now),
            ProjectStatus::Draft => {}
        }
        self.status = next;
        Ok(())
    }

    /// Like [`Project::transition_to`], but only from `expected`.
    ///
    /// Some edges share a target (Open → InProgress and InReview → InProgress),
    /// so an operation names the one source it is allowed to leave.
    pub fn transition_from(
        &mut self,
        expected: ProjectStatus,
        next: ProjectStatus,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        if self.status != expected {
            return Err(LifecycleError::InvalidTransition {
                project: self.id,
                from: self.status,
                to: next,
            });
        }
        self.transition_to(next, now)
    }

    /// Open → InProgress with the winning application and its escrow.
    pub fn assign_provider(
        &mut self,
        application: ApplicationId,
        provider: UserId,
        escrow_tx: EscrowTxId,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        self.transition_to(ProjectStatus::InProgress, now)?;
        self.selected_application = Some(application);
        self.provider = Some(provider);
        self.escrow_tx = Some(escrow_tx);
        Ok(())
    }

    /// Compensation for a selection that could not be completed: back to
    /// Open with no provider. Not a status-table transition.
    pub fn undo_selection(&mut self) {
        self.status = ProjectStatus::Open;
        self.selected_at = None;
        self.selected_application = None;
        self.provider = None;
        self.escrow_tx = None;
    }

    pub fn cancel(
        &mut self,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        self.transition_to(ProjectStatus::Cancelled, now)?;
        self.cancellation_reason = Some(reason.into());
        Ok(())
    }

    /// Parties that share the project chat: the creator and the provider.
    pub fn parties(&self) -> Vec<UserId> {
        std::iter::once(self.owner).chain(self.provider).collect()
    }
}
