//! # Rating Collector Service
//!
//! Collects the rating pair that closes every completed project and keeps
//! the ratee's reputation current.

use crate::domain::{
    invariant_rating_parties, NewRating, Rating, RatingComment, RatingError, RatingPrompt, Stars,
};
use crate::ports::{ProjectDirectory, RatingCollectorApi, RatingRepository};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, MarketplaceEvent, NotificationKind};
use shared_types::{ProjectId, TimeSource, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use td_05_reputation_guard::ReputationApi;
use tracing::{info, warn};

/// The rating collector.
pub struct RatingCollector {
    repository: Arc<dyn RatingRepository>,
    directory: Arc<dyn ProjectDirectory>,
    reputation: Arc<dyn ReputationApi>,
    publisher: Arc<dyn EventPublisher>,
    time: Arc<dyn TimeSource>,
    /// Outstanding prompts by (project, user).
    prompts: RwLock<HashMap<(ProjectId, UserId), RatingPrompt>>,
}

impl RatingCollector {
    pub fn new(
        repository: Arc<dyn RatingRepository>,
        directory: Arc<dyn ProjectDirectory>,
        reputation: Arc<dyn ReputationApi>,
        publisher: Arc<dyn EventPublisher>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            repository,
            directory,
            reputation,
            publisher,
            time,
            prompts: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RatingCollectorApi for RatingCollector {
    async fn prompt_ratings(&self, project: ProjectId) -> Result<Vec<RatingPrompt>, RatingError> {
        let summary = self
            .directory
            .summary(project)
            .ok_or(RatingError::ProjectNotFound(project))?;
        let provider = summary.provider.ok_or(RatingError::ProjectNotCompleted {
            project,
            status: summary.status,
        })?;
        invariant_rating_parties(&summary, summary.owner, provider)?;

        let now = self.time.now();
        let mut issued = Vec::with_capacity(2);
        for (user, counterparty) in [(summary.owner, provider), (provider, summary.owner)] {
            if self.repository.find(project, user).is_some() {
                continue;
            }
            let prompt = RatingPrompt {
                project,
                user,
                counterparty,
                issued_at: now,
            };
            self.prompts.write().insert((project, user), prompt.clone());
            self.publisher
                .publish(MarketplaceEvent::Notification {
                    recipient: user,
                    kind: NotificationKind::RatingPrompt,
                    project,
                })
                .await;
            issued.push(prompt);
        }

        info!(project = %project, prompts = issued.len(), "Rating prompts issued");
        Ok(issued)
    }

    async fn record_rating(
        &self,
        project: ProjectId,
        rater: UserId,
        ratee: UserId,
        stars: u8,
        comment: Option<RatingComment>,
    ) -> Result<Rating, RatingError> {
        let summary = self
            .directory
            .summary(project)
            .ok_or(RatingError::ProjectNotFound(project))?;
        invariant_rating_parties(&summary, rater, ratee)?;
        let stars = Stars::new(stars)?;

        let rating = self
            .repository
            .insert(NewRating {
                project,
                rater,
                ratee,
                stars,
                comment,
                created_at: self.time.now(),
            })
            .inspect_err(|e| warn!(project = %project, rater = %rater, error = %e, "Rating rejected"))?;
        self.prompts.write().remove(&(project, rater));

        info!(
            project = %project,
            rater = %rater,
            ratee = %ratee,
            stars = stars.value(),
            "Rating recorded"
        );

        // The rating is committed; a failed recompute is retried by the next one.
        if let Err(e) = self.reputation.recompute(ratee).await {
            warn!(user = %ratee, error = %e, "Reputation recompute failed");
        }

        if self.repository.for_project(project).len() == 2 {
            info!(project = %project, "Rating pair complete");
        }
        Ok(rating)
    }

    fn ratings_for_project(&self, project: ProjectId) -> Vec<Rating> {
        self.repository.for_project(project)
    }

    fn pending_prompts(&self, user: UserId) -> Vec<RatingPrompt> {
        let mut prompts: Vec<RatingPrompt> = self
            .prompts
            .read()
            .values()
            .filter(|p| p.user == user)
            .cloned()
            .collect();
        prompts.sort_by_key(|p| p.issued_at);
        prompts
    }
}
