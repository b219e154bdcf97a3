//! # Outbound Ports
//!
//! Rating storage and the project read model.

use crate::domain::{NewRating, Rating, RatingError};
use shared_types::{ProjectId, ProjectSummary, UserId};

/// Rating storage - outbound port.
///
/// Write-once per `(project, rater)`; the check and the write are atomic.
pub trait RatingRepository: Send + Sync {
    /// Store a rating, assigning its insertion sequence. Fails with
    /// `DuplicateRating` if the rater already rated on the project.
    fn insert(&self, rating: NewRating) -> Result<Rating, RatingError>;

    fn for_project(&self, project: ProjectId) -> Vec<Rating>;

    fn received_by(&self, user: UserId) -> Vec<Rating>;

    fn find(&self, project: ProjectId, rater: UserId) -> Option<Rating>;
}

/// Project read model - outbound port.
pub trait ProjectDirectory: Send + Sync {
    fn summary(&self, project: ProjectId) -> Option<ProjectSummary>;
}
