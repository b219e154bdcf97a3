//! # Inbound Ports
//!
//! API trait defining what the Reputation Guard can do.

use crate::domain::ReputationError;
use async_trait::async_trait;
use shared_types::{ReputationSnapshot, UserId};

/// Reputation API - inbound port.
#[async_trait]
pub trait ReputationApi: Send + Sync {
    /// Rebuild the user's snapshot from rating history.
    ///
    /// Idempotent: if the derived values are unchanged the stored snapshot is
    /// returned untouched.
    async fn recompute(&self, user: UserId) -> Result<ReputationSnapshot, ReputationError>;

    /// The stored snapshot. Users never recomputed get an empty snapshot
    /// with `recomputed_at == 0`.
    fn snapshot(&self, user: UserId) -> ReputationSnapshot;

    /// Whether the user's marketplace visibility is reduced.
    fn visibility_flag(&self, user: UserId) -> bool {
        self.snapshot(user).visibility_flag
    }
}
