//! # Integration Harness
//!
//! An engine container on a manual clock, with a retry policy fast enough for
//! tests, plus helpers that walk projects through common journeys.

pub mod concurrency;
pub mod flows;

use engine_runtime::container::{EngineConfig, EngineContainer};
use shared_bus::{EventFilter, MarketplaceEvent, Subscription};
use shared_types::{Amount, ManualTimeSource, ProjectId, UserId};
use std::sync::Arc;
use td_01_escrow_ledger::{InMemoryPaymentProcessor, RetryPolicy};
use td_03_project_lifecycle::{ProjectDraft, ProjectLifecycleApi};
use td_04_rating_collector::RatingCollectorApi;

pub struct Harness {
    pub engine: EngineContainer,
    pub clock: Arc<ManualTimeSource>,
    pub processor: Arc<InMemoryPaymentProcessor>,
}

/// Engine config with millisecond backoff and no jitter.
pub fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.escrow.retry = RetryPolicy {
        max_attempts: 3,
        call_timeout_ms: 200,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        jitter: false,
    };
    config
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(fast_config())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let clock = Arc::new(ManualTimeSource::new(1_700_000_000_000));
        let processor = Arc::new(InMemoryPaymentProcessor::new());
        let engine = EngineContainer::with_parts(config, processor.clone(), clock.clone())
            .expect("test config is valid");
        Self {
            engine,
            clock,
            processor,
        }
    }

    pub fn subscribe(&self) -> Subscription {
        self.engine.bus.subscribe(EventFilter::all())
    }

    /// A published project with no applications yet.
    pub async fn open_project(&self, creator: UserId, budget: Amount) -> ProjectId {
        let lifecycle = &self.engine.lifecycle;
        let project = lifecycle
            .create_project(ProjectDraft::new(creator, "Integration project", budget))
            .await
            .expect("create");
        lifecycle.publish(project.id).await.expect("publish");
        project.id
    }

    /// A project already in progress with `provider` selected.
    pub async fn project_in_progress(
        &self,
        creator: UserId,
        provider: UserId,
        budget: Amount,
    ) -> ProjectId {
        let project = self.open_project(creator, budget).await;
        let lifecycle = &self.engine.lifecycle;
        let application = lifecycle
            .apply(project, provider, None)
            .await
            .expect("apply");
        lifecycle
            .select_applicant(project, application.id)
            .await
            .expect("select");
        project
    }

    /// A completed project.
    pub async fn completed_project(
        &self,
        creator: UserId,
        provider: UserId,
        budget: Amount,
    ) -> ProjectId {
        let project = self.project_in_progress(creator, provider, budget).await;
        let lifecycle = &self.engine.lifecycle;
        lifecycle.submit_delivery(project).await.expect("submit");
        lifecycle.approve(project).await.expect("approve");
        project
    }

    /// Completes a project and has the creator rate the provider.
    pub async fn rated_delivery(&self, provider: UserId, stars: u8) -> ProjectId {
        let creator = UserId::new();
        let project = self.completed_project(creator, provider, 100).await;
        self.engine
            .ratings
            .record_rating(project, creator, provider, stars, None)
            .await
            .expect("rating");
        self.clock.advance(1_000);
        project
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn drain(subscription: &mut Subscription) -> Vec<MarketplaceEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = subscription.try_recv() {
        events.push(event);
    }
    events
}
