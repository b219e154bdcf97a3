//! # Domain Errors
//!
//! Error types for the Rating Collector.

use shared_types::{ProjectId, ProjectStatus, UserId};
use thiserror::Error;

/// Rating error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    /// The rater already rated on this project.
    #[error("Duplicate rating by {rater} on project {project}")]
    DuplicateRating {
        /// Project
        project: ProjectId,
        /// Rater
        rater: UserId,
    },

    /// Ratings open only once the project is Completed.
    #[error("Project {project} is not completed (status: {status})")]
    ProjectNotCompleted {
        /// Project
        project: ProjectId,
        /// Current status
        status: ProjectStatus,
    },

    /// Rater is neither the creator nor the selected provider.
    #[error("User {rater} cannot rate on project {project}")]
    InvalidRater {
        /// Project
        project: ProjectId,
        /// Rejected rater
        rater: UserId,
    },

    /// Ratee is not the rater's counterparty.
    #[error("User {ratee} is not the counterparty on project {project}")]
    InvalidRatee {
        /// Project
        project: ProjectId,
        /// Rejected ratee
        ratee: UserId,
    },

    /// Star value outside 1..=5.
    #[error("Invalid stars: {0} (expected 1..=5)")]
    InvalidStars(u8),

    /// Comment body too long.
    #[error("Comment too long: {len} > {max} characters")]
    CommentTooLong {
        /// Submitted length
        len: usize,
        /// Limit
        max: usize,
    },

    /// Project not found.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),
}
