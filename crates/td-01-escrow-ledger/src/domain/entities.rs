//! # Domain Entities
//!
//! The escrow transaction, its append-only event log, and captures whose
//! outcome the ledger never learned.

use super::errors::EscrowError;
use super::invariants::{invariant_conservation, invariant_monotonic};
use super::value_objects::{EscrowAction, EscrowState, IdempotencyKey};
use serde::{Deserialize, Serialize};
use shared_types::{Amount, EscrowTxId, ProjectId, Timestamp, UserId};

/// One entry in a transaction's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowEvent {
    /// State entered by this event.
    pub kind: EscrowState,
    /// Amount moved to the provider.
    pub to_provider: Amount,
    /// Amount moved to the creator.
    pub to_creator: Amount,
    /// Processor references acknowledging the movement.
    pub processor_references: Vec<String>,
    pub at: Timestamp,
}

/// Parameters for opening a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoldParams {
    pub project: ProjectId,
    /// The creator.
    pub payer: UserId,
    /// The selected provider.
    pub payee: UserId,
    pub amount: Amount,
    /// 1-based count of transactions on the project.
    pub ordinal: u32,
    /// Reference returned by the processor's capture.
    pub capture_reference: String,
    pub created_at: Timestamp,
}

/// A capture that ran out of attempts without an answer.
///
/// The processor may have executed it. Until it is replayed under the same
/// key (by the next hold, or by a void) the ledger cannot say whether the
/// payer was charged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InDoubtHold {
    pub project: ProjectId,
    pub payer: UserId,
    pub payee: UserId,
    pub amount: Amount,
    /// Ordinal the failed capture was keyed with.
    pub ordinal: u32,
    pub since: Timestamp,
}

impl InDoubtHold {
    /// Key of the original capture.
    pub fn capture_key(&self) -> IdempotencyKey {
        IdempotencyKey::new(self.project, EscrowAction::Hold, self.ordinal)
    }

    /// A hold with the same payer and amount can replay this capture.
    pub fn matches(&self, payer: UserId, amount: Amount) -> bool {
        self.payer == payer && self.amount == amount
    }
}

/// Funds held in custody against one project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowTransaction {
    pub id: EscrowTxId,
    pub project: ProjectId,
    pub payer: UserId,
    pub payee: UserId,
    pub held_amount: Amount,
    pub state: EscrowState,
    /// Running total paid to the provider.
    pub released_amount: Amount,
    /// Running total returned to the creator.
    pub refunded_amount: Amount,
    pub ordinal: u32,
    pub events: Vec<EscrowEvent>,
    pub created_at: Timestamp,
}

impl EscrowTransaction {
    /// Open a Held transaction after the processor captured the funds.
    pub fn held(params: HoldParams) -> Self {
        Self {
            id: EscrowTxId::new(),
            project: params.project,
            payer: params.payer,
            payee: params.payee,
            held_amount: params.amount,
            state: EscrowState::Held,
            released_amount: 0,
            refunded_amount: 0,
            ordinal: params.ordinal,
            events: vec![EscrowEvent {
                kind: EscrowState::Held,
                to_provider: 0,
                to_creator: 0,
                processor_references: vec![params.capture_reference],
                at: params.created_at,
            }],
            created_at: params.created_at,
        }
    }

    /// Amount still in custody.
    pub fn remaining(&self) -> Amount {
        self.held_amount
            .saturating_sub(self.released_amount)
            .saturating_sub(self.refunded_amount)
    }

    /// Check that the transaction may move to `next`.
    pub fn ensure_can_transition(&self, next: EscrowState) -> Result<(), EscrowError> {
        if !invariant_monotonic(self.state, next) {
            return Err(EscrowError::InvalidEscrowState {
                from: format!("{:?}", self.state),
                to: format!("{:?}", next),
            });
        }
        Ok(())
    }

    /// Apply an acknowledged settlement.
    ///
    /// Nothing is mutated if the transition or the amounts are invalid.
    pub fn settle(
        &mut self,
        next: EscrowState,
        to_provider: Amount,
        to_creator: Amount,
        processor_references: Vec<String>,
        at: Timestamp,
    ) -> Result<(), EscrowError> {
        self.ensure_can_transition(next)?;

        let released = self.released_amount.saturating_add(to_provider);
        let refunded = self.refunded_amount.saturating_add(to_creator);
        invariant_conservation(self.held_amount, released, refunded)?;

        self.released_amount = released;
        self.refunded_amount = refunded;
        self.state = next;
        self.events.push(EscrowEvent {
            kind: next,
            to_provider,
            to_creator,
            processor_references,
            at,
        });
        Ok(())
    }
}
