//! # Outbound Ports
//!
//! Where rating history comes from.

use crate::domain::{ReceivedRating, ReputationError};
use async_trait::async_trait;
use shared_types::UserId;

/// Rating history - outbound port.
///
/// Implemented by the rating store; the guard only ever reads it.
#[async_trait]
pub trait RatingSource: Send + Sync {
    /// Every rating the user has received, in any order.
    async fn ratings_received(&self, user: UserId) -> Result<Vec<ReceivedRating>, ReputationError>;
}
