//! # Domain Entities

use super::value_objects::{RatingComment, Stars};
use serde::{Deserialize, Serialize};
use shared_types::{ProjectId, RatingId, Timestamp, UserId};

/// One party's immutable verdict on the other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub project: ProjectId,
    pub rater: UserId,
    pub ratee: UserId,
    pub stars: Stars,
    pub comment: Option<RatingComment>,
    pub created_at: Timestamp,
    /// Store-assigned insertion order.
    pub sequence: u64,
}

/// Parameters for a new rating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRating {
    pub project: ProjectId,
    pub rater: UserId,
    pub ratee: UserId,
    pub stars: Stars,
    pub comment: Option<RatingComment>,
    pub created_at: Timestamp,
}

impl NewRating {
    /// Materialize with the store's sequence number.
    pub fn into_rating(self, sequence: u64) -> Rating {
        Rating {
            id: RatingId::new(),
            project: self.project,
            rater: self.rater,
            ratee: self.ratee,
            stars: self.stars,
            comment: self.comment,
            created_at: self.created_at,
            sequence,
        }
    }
}

/// An outstanding request for `user` to rate `counterparty`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPrompt {
    pub project: ProjectId,
    pub user: UserId,
    pub counterparty: UserId,
    pub issued_at: Timestamp,
}
