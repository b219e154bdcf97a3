//! Configuration for the Reputation Guard

use crate::domain::ReputationError;
use serde::{Deserialize, Serialize};

/// Reputation configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Number of most recent ratings averaged
    pub window: usize,
    /// Averages strictly below this reduce visibility
    pub threshold: f64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            window: 5,
            threshold: 3.0,
        }
    }
}

impl ReputationConfig {
    pub fn validate(&self) -> Result<(), ReputationError> {
        if self.window == 0 {
            return Err(ReputationError::InvalidConfig("window must be >= 1".into()));
        }
        if !(1.0..=5.0).contains(&self.threshold) {
            return Err(ReputationError::InvalidConfig(format!(
                "threshold {} outside 1.0..=5.0",
                self.threshold
            )));
        }
        Ok(())
    }
}
