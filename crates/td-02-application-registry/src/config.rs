//! Configuration for the Application Registry

use serde::{Deserialize, Serialize};

/// Registry configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Longest accepted cover letter, in characters
    pub max_cover_letter_chars: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_cover_letter_chars: 5_000,
        }
    }
}
