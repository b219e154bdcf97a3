//! In-memory rating storage.
//!
//! Doubles as the rating history source for the reputation guard.

use crate::domain::{NewRating, Rating, RatingError};
use crate::ports::outbound::RatingRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ProjectId, UserId};
use std::collections::HashMap;
use td_05_reputation_guard::{RatingSource, ReceivedRating, ReputationError};

#[derive(Default)]
struct Tables {
    by_slot: HashMap<(ProjectId, UserId), Rating>,
    next_sequence: u64,
}

/// Rating repository backed by a hash map keyed on `(project, rater)`.
#[derive(Default)]
pub struct InMemoryRatingRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRatingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RatingRepository for InMemoryRatingRepository {
    fn insert(&self, rating: NewRating) -> Result<Rating, RatingError> {
        let mut tables = self.tables.write();
        let slot = (rating.project, rating.rater);
        if tables.by_slot.contains_key(&slot) {
            return Err(RatingError::DuplicateRating {
                project: rating.project,
                rater: rating.rater,
            });
        }
        tables.next_sequence += 1;
        let stored = rating.into_rating(tables.next_sequence);
        tables.by_slot.insert(slot, stored.clone());
        Ok(stored)
    }

    fn for_project(&self, project: ProjectId) -> Vec<Rating> {
        let mut ratings: Vec<Rating> = self
            .tables
            .read()
            .by_slot
            .values()
            .filter(|r| r.project == project)
            .cloned()
            .collect();
        ratings.sort_by_key(|r| r.sequence);
        ratings
    }

    fn received_by(&self, user: UserId) -> Vec<Rating> {
        let mut ratings: Vec<Rating> = self
            .tables
            .read()
            .by_slot
            .values()
            .filter(|r| r.ratee == user)
            .cloned()
            .collect();
        ratings.sort_by_key(|r| r.sequence);
        ratings
    }

    fn find(&self, project: ProjectId, rater: UserId) -> Option<Rating> {
        self.tables.read().by_slot.get(&(project, rater)).cloned()
    }
}

#[async_trait]
impl RatingSource for InMemoryRatingRepository {
    async fn ratings_received(&self, user: UserId) -> Result<Vec<ReceivedRating>, ReputationError> {
        Ok(self
            .received_by(user)
            .into_iter()
            .map(|r| ReceivedRating {
                stars: r.stars.value(),
                created_at: r.created_at,
                sequence: r.sequence,
            })
            .collect())
    }
}
