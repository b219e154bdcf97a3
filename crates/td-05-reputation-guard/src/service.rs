//! # Reputation Guard Service
//!
//! Recomputes snapshots from the full rating history on every write; a
//! snapshot is never incremented in place.

use crate::algorithms::{rolling_average, select_window};
use crate::config::ReputationConfig;
use crate::domain::{invariant_visibility, ReputationError};
use crate::ports::{RatingSource, ReputationApi};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, MarketplaceEvent};
use shared_types::{KeyedLocks, ReputationSnapshot, TimeSource, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// The reputation guard.
pub struct ReputationGuard {
    config: ReputationConfig,
    source: Arc<dyn RatingSource>,
    publisher: Arc<dyn EventPublisher>,
    time: Arc<dyn TimeSource>,
    snapshots: RwLock<HashMap<UserId, ReputationSnapshot>>,
    locks: KeyedLocks<UserId>,
}

impl ReputationGuard {
    pub fn new(
        config: ReputationConfig,
        source: Arc<dyn RatingSource>,
        publisher: Arc<dyn EventPublisher>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ReputationError> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            publisher,
            time,
            snapshots: RwLock::new(HashMap::new()),
            locks: KeyedLocks::new(),
        })
    }

    pub fn config(&self) -> &ReputationConfig {
        &self.config
    }

    /// Drop lock slots no recompute is holding or waiting on.
    pub fn prune_locks(&self) -> usize {
        self.locks.prune()
    }

    /// Users whose visibility is currently reduced.
    pub fn flagged_users(&self) -> Vec<UserId> {
        self.snapshots
            .read()
            .values()
            .filter(|s| s.visibility_flag)
            .map(|s| s.user)
            .collect()
    }
}

#[async_trait]
impl ReputationApi for ReputationGuard {
    async fn recompute(&self, user: UserId) -> Result<ReputationSnapshot, ReputationError> {
        // History read and snapshot write happen under the user's lock.
        let _guard = self.locks.lock(&user).await;

        let history = self.source.ratings_received(user).await?;
        let window = select_window(history, self.config.window);
        let average = rolling_average(&window);
        let candidate = ReputationSnapshot {
            user,
            average,
            window_count: window.len(),
            visibility_flag: invariant_visibility(window.len(), average, self.config.threshold),
            newest_rating_at: window.first().map(|r| r.created_at),
            recomputed_at: self.time.now(),
        };

        let previous = self.snapshots.read().get(&user).cloned();
        if let Some(existing) = &previous {
            if existing.same_values(&candidate) {
                debug!(user = %user, "Reputation unchanged");
                return Ok(existing.clone());
            }
        }

        self.snapshots.write().insert(user, candidate.clone());

        let was_flagged = previous.as_ref().is_some_and(|s| s.visibility_flag);
        info!(
            user = %user,
            average = ?candidate.average,
            window_count = candidate.window_count,
            flagged = candidate.visibility_flag,
            "Reputation recomputed"
        );
        if was_flagged != candidate.visibility_flag {
            self.publisher
                .publish(MarketplaceEvent::VisibilityChanged {
                    user,
                    flagged: candidate.visibility_flag,
                })
                .await;
        }

        Ok(candidate)
    }

    fn snapshot(&self, user: UserId) -> ReputationSnapshot {
        self.snapshots
            .read()
            .get(&user)
            .cloned()
            .unwrap_or_else(|| ReputationSnapshot::empty(user, 0))
    }
}
