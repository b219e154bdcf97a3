//! # Inbound Ports
//!
//! API trait defining what the Escrow Ledger can do.

use crate::domain::{EscrowError, EscrowTransaction, InDoubtHold};
use async_trait::async_trait;
use shared_types::{Amount, ProjectId, UserId};

/// Escrow ledger API - inbound port.
///
/// Operations on one project are serialized; different projects proceed in
/// parallel. A state change is committed only after the processor
/// acknowledges it.
#[async_trait]
pub trait EscrowLedgerApi: Send + Sync {
    /// Capture `amount` from the payer and hold it against the project.
    async fn hold(
        &self,
        project: ProjectId,
        payer: UserId,
        payee: UserId,
        amount: Amount,
    ) -> Result<EscrowTransaction, EscrowError>;

    /// Held → Released. Full amount to the provider.
    async fn release(&self, project: ProjectId) -> Result<EscrowTransaction, EscrowError>;

    /// Held → Refunded. Full amount to the creator.
    async fn refund(&self, project: ProjectId) -> Result<EscrowTransaction, EscrowError>;

    /// Held → PartiallyReleased. Shares must sum to the held amount.
    async fn partial_release(
        &self,
        project: ProjectId,
        provider_share: Amount,
        creator_share: Amount,
    ) -> Result<EscrowTransaction, EscrowError>;

    /// Settle a capture left in doubt by an exhausted hold.
    ///
    /// The capture is replayed under its original key, so the payer is charged
    /// exactly once, and then refunded in full. Returns the Refunded
    /// transaction, or `None` when nothing was in doubt.
    async fn void_in_doubt(
        &self,
        project: ProjectId,
    ) -> Result<Option<EscrowTransaction>, EscrowError>;

    /// The capture currently in doubt for the project, if any.
    fn in_doubt(&self, project: ProjectId) -> Option<InDoubtHold>;

    /// The project's current (latest) transaction.
    fn transaction(&self, project: ProjectId) -> Option<EscrowTransaction>;

    /// Every transaction the project ever had, oldest first.
    fn history(&self, project: ProjectId) -> Vec<EscrowTransaction>;
}
