//! # Value Objects
//!
//! Escrow state machine and the idempotency keys handed to the processor.

use serde::{Deserialize, Serialize};
use shared_types::ProjectId;
use std::fmt;

/// Escrow transaction state machine.
///
/// ```text
///          ┌──release──→ [Released]
/// [Held] ──┼──refund───→ [Refunded]
///          └──partial──→ [PartiallyReleased]
/// ```
///
/// Monotonic: nothing ever returns to `Held`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowState {
    /// Funds captured from the payer and held in custody.
    #[default]
    Held,
    /// Full amount paid out to the provider.
    Released,
    /// Full amount returned to the creator.
    Refunded,
    /// Amount split between provider and creator.
    PartiallyReleased,
}

impl EscrowState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: EscrowState) -> bool {
        matches!(
            (self, next),
            (Self::Held, Self::Released)
                | (Self::Held, Self::Refunded)
                | (Self::Held, Self::PartiallyReleased)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Held)
    }
}

/// A ledger action that reaches the payment processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowAction {
    Hold,
    Release,
    Refund,
    /// Provider leg of a split.
    PartialRelease,
    /// Creator leg of a split.
    PartialRefund,
}

impl EscrowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Release => "release",
            Self::Refund => "refund",
            Self::PartialRelease => "partial_release",
            Self::PartialRefund => "partial_refund",
        }
    }
}

/// Deterministic idempotency key: `{project}:{action}:{ordinal}`.
///
/// `ordinal` counts escrow transactions on the project (1-based), so a retry
/// of the same logical call always carries the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn new(project: ProjectId, action: EscrowAction, ordinal: u32) -> Self {
        Self(format!("{}:{}:{}", project, action.as_str(), ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
