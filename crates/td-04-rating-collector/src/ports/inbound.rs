//! # Inbound Ports
//!
//! API trait defining what the Rating Collector can do.

use crate::domain::{Rating, RatingComment, RatingError, RatingPrompt};
use async_trait::async_trait;
use shared_types::{ProjectId, UserId};

/// Rating collector API - inbound port.
#[async_trait]
pub trait RatingCollectorApi: Send + Sync {
    /// Ask both parties of a Completed project to rate each other.
    async fn prompt_ratings(&self, project: ProjectId) -> Result<Vec<RatingPrompt>, RatingError>;

    /// Store a rating and recompute the ratee's reputation.
    async fn record_rating(
        &self,
        project: ProjectId,
        rater: UserId,
        ratee: UserId,
        stars: u8,
        comment: Option<RatingComment>,
    ) -> Result<Rating, RatingError>;

    fn ratings_for_project(&self, project: ProjectId) -> Vec<Rating>;

    /// Prompts the user has not answered yet.
    fn pending_prompts(&self, user: UserId) -> Vec<RatingPrompt>;
}
