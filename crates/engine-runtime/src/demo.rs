//! # Demonstration Flow
//!
//! Drives two projects through the engine: one to completion with a revision
//! round and mutual ratings, one cancelled after selection.

use crate::container::EngineContainer;
use anyhow::{ensure, Context, Result};
use shared_types::{Amount, ProjectId, ProjectStatus, ReputationSnapshot, UserId};
use td_01_escrow_ledger::{EscrowLedgerApi, EscrowState};
use td_03_project_lifecycle::{ProjectDraft, ProjectLifecycleApi};
use td_04_rating_collector::{CommentTag, RatingCollectorApi, RatingComment};
use td_05_reputation_guard::ReputationApi;
use tracing::info;

/// What the demonstration left behind.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub completed: ProjectId,
    pub cancelled: ProjectId,
    pub provider: UserId,
    pub provider_reputation: ReputationSnapshot,
    /// Funds still held by the ledger; zero once both projects settle.
    pub custody: Amount,
    /// Net amount the creator paid across both projects.
    pub creator_net: i128,
}

pub async fn run_demo(container: &EngineContainer) -> Result<DemoReport> {
    let lifecycle = &container.lifecycle;
    let creator = UserId::new();
    let provider = UserId::new();
    let runner_up = UserId::new();

    // Completed project
    let project = lifecycle
        .create_project(
            ProjectDraft::new(creator, "Port billing service", 1_500)
                .with_description("Move the billing worker to the new queue")
                .with_skills(["Rust", "PostgreSQL"]),
        )
        .await?;
    lifecycle.publish(project.id).await?;

    let chosen = lifecycle
        .apply(project.id, provider, Some("Done this twice before".into()))
        .await?;
    lifecycle.apply(project.id, runner_up, None).await?;
    let candidates = lifecycle.list_candidates(project.id).await?;
    info!(project = %project.id, candidates = candidates.len(), "Candidates listed");

    lifecycle.select_applicant(project.id, chosen.id).await?;
    lifecycle.submit_delivery(project.id).await?;
    lifecycle.request_revision(project.id).await?;
    lifecycle.submit_delivery(project.id).await?;
    let completed = lifecycle.approve(project.id).await?;
    ensure!(
        completed.status == ProjectStatus::Completed,
        "project ended in {}",
        completed.status
    );

    let comment = RatingComment::new(CommentTag::Quality, "Clean handover")?;
    container
        .ratings
        .record_rating(project.id, creator, provider, 4, Some(comment))
        .await?;
    container
        .ratings
        .record_rating(project.id, provider, creator, 5, None)
        .await?;

    // Cancelled project
    let second = lifecycle
        .create_project(ProjectDraft::new(creator, "Audit logging", 600))
        .await?;
    lifecycle.publish(second.id).await?;
    let app = lifecycle.apply(second.id, provider, None).await?;
    lifecycle.select_applicant(second.id, app.id).await?;
    lifecycle
        .cancel(second.id, "Budget moved to next quarter".into())
        .await?;

    let refund = container
        .ledger
        .transaction(second.id)
        .context("cancelled project has no escrow record")?;
    ensure!(
        refund.state == EscrowState::Refunded,
        "escrow ended in {:?}",
        refund.state
    );

    let report = DemoReport {
        completed: project.id,
        cancelled: second.id,
        provider,
        provider_reputation: container.reputation.snapshot(provider),
        custody: container.ledger.total_in_custody(),
        creator_net: container.processor.net_charged(creator),
    };
    info!(
        completed = %report.completed,
        cancelled = %report.cancelled,
        provider_average = ?report.provider_reputation.average,
        custody = report.custody,
        creator_net = report.creator_net,
        "Demonstration finished"
    );
    Ok(report)
}
