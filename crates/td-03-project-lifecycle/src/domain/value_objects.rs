//! # Value Objects
//!
//! Inputs to project creation and dispute settlement.

use serde::{Deserialize, Serialize};
use shared_types::{Amount, UserId};
use std::collections::BTreeSet;

/// Everything a creator supplies when creating a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub owner: UserId,
    pub title: String,
    pub description: String,
    /// Amount held in escrow on selection.
    pub budget: Amount,
    pub required_skills: BTreeSet<String>,
}

impl ProjectDraft {
    pub fn new(owner: UserId, title: impl Into<String>, budget: Amount) -> Self {
        Self {
            owner,
            title: title.into(),
            description: String::new(),
            budget,
            required_skills: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = normalize_skills(skills.into_iter().map(Into::into));
        self
    }
}

/// Trimmed, lower-cased, de-duplicated skill names. Blank entries are dropped.
pub fn normalize_skills<I>(skills: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    skills
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// How a disputed escrow is divided.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeSettlement {
    pub provider_share: Amount,
    pub creator_share: Amount,
    pub reason: String,
}
