//! # Domain Errors
//!
//! Error types for the Escrow Ledger.

use shared_types::{Amount, ProjectId};
use thiserror::Error;

/// Escrow ledger error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// A Held transaction already exists for the project.
    #[error("Escrow already held for project {0}")]
    EscrowAlreadyHeld(ProjectId),

    /// No transaction exists for the project.
    #[error("No escrow for project {0}")]
    NoEscrow(ProjectId),

    /// The transaction is not in a state that allows the action.
    #[error("Invalid escrow transition: {from} -> {to}")]
    InvalidEscrowState {
        /// Current state
        from: String,
        /// Attempted state
        to: String,
    },

    /// Split shares do not add up to the held amount.
    #[error("Amount mismatch: provider {provider_share} + creator {creator_share} != held {held}")]
    AmountMismatch {
        /// Amount in custody
        held: Amount,
        /// Requested provider share
        provider_share: Amount,
        /// Requested creator share
        creator_share: Amount,
    },

    /// Zero or otherwise unusable amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    /// Released plus refunded would exceed the held amount.
    #[error("Conservation violated: released {released} + refunded {refunded} > held {held}")]
    ConservationViolated {
        /// Amount in custody
        held: Amount,
        /// Total paid to provider
        released: Amount,
        /// Total returned to creator
        refunded: Amount,
    },

    /// The processor did not acknowledge after every retry.
    #[error("Payment processor unavailable after {attempts} attempts: {reason}")]
    ProcessorUnavailable {
        /// Attempts made
        attempts: u32,
        /// Last failure
        reason: String,
    },

    /// The processor refused the operation.
    #[error("Payment processor declined: {0}")]
    ProcessorDeclined(String),
}

impl EscrowError {
    /// True for failures originating at the payment processor.
    pub fn is_processor_failure(&self) -> bool {
        matches!(
            self,
            Self::ProcessorUnavailable { .. } | Self::ProcessorDeclined(_)
        )
    }
}
