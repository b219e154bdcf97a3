//! # Engine Container
//!
//! Builds every component in dependency order and shares one event bus.
//!
//! ```text
//! Level 0: event bus, time source, payment processor, storage
//! Level 1: ReputationGuard (reads the rating store)
//! Level 2: EscrowLedger, ApplicationRegistry (profiles from reputation + projects)
//! Level 3: RatingCollector (project directory + reputation)
//! Level 4: ProjectLifecycleService (drives all of the above)
//! ```

use super::config::{ConfigError, EngineConfig};
use shared_bus::InMemoryEventBus;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use td_01_escrow_ledger::{EscrowLedger, InMemoryPaymentProcessor};
use td_02_application_registry::{ApplicationRegistry, InMemoryApplicationRepository};
use td_03_project_lifecycle::{
    InMemoryProjectRepository, LifecycleDependencies, MarketplaceProfileSource,
    ProjectLifecycleService, RepositoryDirectory,
};
use td_04_rating_collector::{InMemoryRatingRepository, RatingCollector};
use td_05_reputation_guard::ReputationGuard;
use tracing::info;

/// All engine services, wired.
pub struct EngineContainer {
    pub config: EngineConfig,
    pub bus: Arc<InMemoryEventBus>,
    pub time: Arc<dyn TimeSource>,
    pub processor: Arc<InMemoryPaymentProcessor>,
    pub projects: Arc<InMemoryProjectRepository>,
    pub rating_store: Arc<InMemoryRatingRepository>,
    pub ledger: Arc<EscrowLedger>,
    pub registry: Arc<ApplicationRegistry>,
    pub reputation: Arc<ReputationGuard>,
    pub ratings: Arc<RatingCollector>,
    pub lifecycle: Arc<ProjectLifecycleService>,
}

impl EngineContainer {
    /// Wall-clock time and the simulated payment processor.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_parts(
            config,
            Arc::new(InMemoryPaymentProcessor::new()),
            Arc::new(SystemTimeSource),
        )
    }

    pub fn with_parts(
        config: EngineConfig,
        processor: Arc<InMemoryPaymentProcessor>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        // Level 0
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.event_bus_capacity));
        let projects = Arc::new(InMemoryProjectRepository::new());
        let rating_store = Arc::new(InMemoryRatingRepository::new());

        // Level 1
        let reputation = Arc::new(
            ReputationGuard::new(
                config.reputation.clone(),
                rating_store.clone(),
                bus.clone(),
                time.clone(),
            )
            .map_err(|e| ConfigError::Invalid(e.to_string()))?,
        );

        // Level 2
        let ledger = Arc::new(EscrowLedger::new(
            config.escrow.clone(),
            processor.clone(),
            time.clone(),
        ));
        let registry = Arc::new(ApplicationRegistry::new(
            config.registry.clone(),
            Arc::new(InMemoryApplicationRepository::new()),
            Arc::new(MarketplaceProfileSource::new(
                reputation.clone(),
                projects.clone(),
            )),
            time.clone(),
        ));

        // Level 3
        let ratings = Arc::new(RatingCollector::new(
            rating_store.clone(),
            Arc::new(RepositoryDirectory::new(projects.clone())),
            reputation.clone(),
            bus.clone(),
            time.clone(),
        ));

        // Level 4
        let lifecycle = Arc::new(ProjectLifecycleService::new(
            config.lifecycle.clone(),
            LifecycleDependencies {
                repository: projects.clone(),
                registry: registry.clone(),
                ledger: ledger.clone(),
                ratings: ratings.clone(),
                publisher: bus.clone(),
                time: time.clone(),
            },
        ));

        info!(
            bus_capacity = config.event_bus_capacity,
            max_attempts = config.escrow.retry.max_attempts,
            reputation_window = config.reputation.window,
            "Engine container initialized"
        );

        Ok(Self {
            config,
            bus,
            time,
            processor,
            projects,
            rating_store,
            ledger,
            registry,
            reputation,
            ratings,
            lifecycle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{ManualTimeSource, UserId};
    use td_03_project_lifecycle::{ProjectDraft, ProjectLifecycleApi};

    #[tokio::test]
    async fn test_container_wires_shared_storage() {
        let container = EngineContainer::with_parts(
            EngineConfig::default(),
            Arc::new(InMemoryPaymentProcessor::new()),
            Arc::new(ManualTimeSource::new(0)),
        )
        .unwrap();

        let project = container
            .lifecycle
            .create_project(ProjectDraft::new(UserId::new(), "Wiring check", 10))
            .await
            .unwrap();
        assert_eq!(container.projects.len(), 1);
        assert_eq!(container.lifecycle.project(project.id), Some(project));
    }

    #[test]
    fn test_invalid_config_refused() {
        let mut config = EngineConfig::default();
        config.reputation.threshold = 9.0;
        assert!(EngineContainer::new(config).is_err());
    }
}
