//! Candidate profiles assembled from reputation and project history.

use crate::ports::outbound::ProjectRepository;
use async_trait::async_trait;
use shared_types::UserId;
use std::sync::Arc;
use td_02_application_registry::{CandidateProfile, CandidateProfileSource, RegistryError};
use td_05_reputation_guard::ReputationApi;

/// Attaches the applicant's reputation snapshot and completed-project count.
pub struct MarketplaceProfileSource {
    reputation: Arc<dyn ReputationApi>,
    projects: Arc<dyn ProjectRepository>,
}

impl MarketplaceProfileSource {
    pub fn new(reputation: Arc<dyn ReputationApi>, projects: Arc<dyn ProjectRepository>) -> Self {
        Self {
            reputation,
            projects,
        }
    }
}

#[async_trait]
impl CandidateProfileSource for MarketplaceProfileSource {
    async fn profile(&self, user: UserId) -> Result<CandidateProfile, RegistryError> {
        Ok(CandidateProfile {
            reputation: self.reputation.snapshot(user),
            completed_projects: self.projects.count_completed_for_provider(user),
        })
    }
}
