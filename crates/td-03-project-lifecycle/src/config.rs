//! Configuration for the Project Lifecycle

use serde::{Deserialize, Serialize};
use shared_types::Amount;

/// Project lifecycle configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Smallest budget a project may be created with
    pub min_budget: Amount,
    /// Longest accepted title, in characters
    pub max_title_chars: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            min_budget: 1,
            max_title_chars: 200,
        }
    }
}
