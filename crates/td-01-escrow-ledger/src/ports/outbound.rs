//! # Outbound Ports
//!
//! The payment processor the ledger depends on.

use crate::domain::IdempotencyKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{Amount, UserId};
use thiserror::Error;

/// Acknowledgement of a processor operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorReceipt {
    /// Processor-side transaction reference.
    pub reference: String,
    pub amount: Amount,
}

/// Processor failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// Processor could not be reached.
    #[error("processor unavailable: {0}")]
    Unavailable(String),

    /// No acknowledgement within the call budget.
    #[error("processor call timed out")]
    Timeout,

    /// Processor refused the operation. Not retried.
    #[error("declined: {0}")]
    Declined(String),
}

impl ProcessorError {
    /// Transient failures are retried under the same idempotency key.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }
}

/// Payment processor - outbound port.
///
/// Every call carries an idempotency key. Replaying a key must return the
/// original receipt without moving money twice.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charge the payer and keep the funds in custody.
    async fn authorize_capture(
        &self,
        key: &IdempotencyKey,
        amount: Amount,
        payer: UserId,
    ) -> Result<ProcessorReceipt, ProcessorError>;

    /// Pay custody funds out to the provider.
    async fn release(
        &self,
        key: &IdempotencyKey,
        amount: Amount,
        payee: UserId,
    ) -> Result<ProcessorReceipt, ProcessorError>;

    /// Return custody funds to the creator.
    async fn refund(
        &self,
        key: &IdempotencyKey,
        amount: Amount,
        payer: UserId,
    ) -> Result<ProcessorReceipt, ProcessorError>;
}
