//! # Domain Invariants
//!
//! Who may rate whom, and when.

use super::errors::RatingError;
use shared_types::{ProjectStatus, ProjectSummary, UserId};

/// Invariant: ratings are exchanged only between the creator and the
/// selected provider of a Completed project, each rating the other.
pub fn invariant_rating_parties(
    project: &ProjectSummary,
    rater: UserId,
    ratee: UserId,
) -> Result<(), RatingError> {
    if project.status != ProjectStatus::Completed {
        return Err(RatingError::ProjectNotCompleted {
            project: project.id,
            status: project.status,
        });
    }
    let counterparty = project
        .counterparty_of(rater)
        .ok_or(RatingError::InvalidRater {
            project: project.id,
            rater,
        })?;
    if ratee != counterparty {
        return Err(RatingError::InvalidRatee {
            project: project.id,
            ratee,
        });
    }
    Ok(())
}
