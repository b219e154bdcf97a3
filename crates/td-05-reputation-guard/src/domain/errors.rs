//! # Domain Errors
//!
//! Error types for the Reputation Guard.

use thiserror::Error;

/// Reputation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReputationError {
    /// Rating history could not be read.
    #[error("Rating source unavailable: {0}")]
    SourceUnavailable(String),

    /// Configuration cannot produce a meaningful snapshot.
    #[error("Invalid reputation config: {0}")]
    InvalidConfig(String),
}
