//! # Error Types
//!
//! Errors shared across engine components.

use thiserror::Error;

/// An identifier string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{input}': {reason}")]
pub struct IdParseError {
    /// Name of the identifier type being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub input: String,
    /// Parser message.
    pub reason: String,
}
