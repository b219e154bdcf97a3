//! Simulated Payment Processor
//!
//! Implements the `PaymentProcessor` port in memory, with knobs for the
//! failure modes the ledger must survive: outages, declines, latency and
//! acknowledgements lost after the money already moved.

use crate::domain::IdempotencyKey;
use crate::ports::outbound::{PaymentProcessor, ProcessorError, ProcessorReceipt};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Amount, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Kind of money movement executed by the processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Capture,
    Release,
    Refund,
}

/// An executed (not merely attempted) processor operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutedOperation {
    pub kind: OperationKind,
    pub amount: Amount,
    pub party: UserId,
    pub receipt: ProcessorReceipt,
}

/// In-memory payment processor.
pub struct InMemoryPaymentProcessor {
    /// Executed operations by idempotency key.
    executed: RwLock<HashMap<String, ExecutedOperation>>,
    /// Next N calls fail with `Unavailable` before doing anything.
    fail_next: AtomicU32,
    /// Next N calls execute, then report `Timeout`.
    lose_next_acks: AtomicU32,
    /// Next N calls are declined.
    decline_next: AtomicU32,
    /// Artificial latency per call (ms).
    latency_ms: AtomicU64,
    /// Calls received, including failed ones.
    calls: AtomicU64,
    sequence: AtomicU64,
}

impl InMemoryPaymentProcessor {
    pub fn new() -> Self {
        Self {
            executed: RwLock::new(HashMap::new()),
            fail_next: AtomicU32::new(0),
            lose_next_acks: AtomicU32::new(0),
            decline_next: AtomicU32::new(0),
            latency_ms: AtomicU64::new(0),
            calls: AtomicU64::new(0),
            sequence: AtomicU64::new(0),
        }
    }

    /// Make the next `n` calls fail as unavailable.
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` calls execute but lose their acknowledgement.
    pub fn lose_next_acks(&self, n: u32) {
        self.lose_next_acks.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` calls be declined.
    pub fn decline_next(&self, n: u32) {
        self.decline_next.store(n, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Calls received so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Operations that actually moved money.
    pub fn executed_count(&self) -> usize {
        self.executed.read().len()
    }

    /// Sum of executed operations of one kind.
    pub fn total(&self, kind: OperationKind) -> Amount {
        self.executed
            .read()
            .values()
            .filter(|op| op.kind == kind)
            .map(|op| op.amount)
            .sum()
    }

    /// Net amount charged to (positive) or paid to (negative) a user.
    pub fn net_charged(&self, user: UserId) -> i128 {
        self.executed
            .read()
            .values()
            .filter(|op| op.party == user)
            .map(|op| match op.kind {
                OperationKind::Capture => op.amount as i128,
                OperationKind::Release | OperationKind::Refund => -(op.amount as i128),
            })
            .sum()
    }

    pub fn operation(&self, key: &IdempotencyKey) -> Option<ExecutedOperation> {
        self.executed.read().get(key.as_str()).cloned()
    }

    fn take_one(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn execute(
        &self,
        kind: OperationKind,
        key: &IdempotencyKey,
        amount: Amount,
        party: UserId,
    ) -> Result<ProcessorReceipt, ProcessorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if Self::take_one(&self.fail_next) {
            debug!(key = %key, "Simulated outage");
            return Err(ProcessorError::Unavailable("simulated outage".into()));
        }
        if Self::take_one(&self.decline_next) {
            return Err(ProcessorError::Declined("simulated decline".into()));
        }

        let receipt = {
            let mut executed = self.executed.write();
            match executed.get(key.as_str()) {
                Some(existing) if existing.kind == kind && existing.amount == amount => {
                    debug!(key = %key, reference = %existing.receipt.reference, "Replayed idempotent call");
                    existing.receipt.clone()
                }
                Some(_) => {
                    return Err(ProcessorError::Declined(format!(
                        "idempotency key {} reused with different parameters",
                        key
                    )));
                }
                None => {
                    let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
                    let prefix = match kind {
                        OperationKind::Capture => "cap",
                        OperationKind::Release => "rel",
                        OperationKind::Refund => "ref",
                    };
                    let receipt = ProcessorReceipt {
                        reference: format!("{}_{:06}", prefix, seq),
                        amount,
                    };
                    executed.insert(
                        key.as_str().to_string(),
                        ExecutedOperation {
                            kind,
                            amount,
                            party,
                            receipt: receipt.clone(),
                        },
                    );
                    info!(key = %key, kind = ?kind, amount, reference = %receipt.reference, "Processor executed");
                    receipt
                }
            }
        };

        if Self::take_one(&self.lose_next_acks) {
            debug!(key = %key, "Simulated lost acknowledgement");
            return Err(ProcessorError::Timeout);
        }
        Ok(receipt)
    }
}

impl Default for InMemoryPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryPaymentProcessor {
    async fn authorize_capture(
        &self,
        key: &IdempotencyKey,
        amount: Amount,
        payer: UserId,
    ) -> Result<ProcessorReceipt, ProcessorError> {
        self.execute(OperationKind::Capture, key, amount, payer).await
    }

    async fn release(
        &self,
        key: &IdempotencyKey,
        amount: Amount,
        payee: UserId,
    ) -> Result<ProcessorReceipt, ProcessorError> {
        self.execute(OperationKind::Release, key, amount, payee).await
    }

    async fn refund(
        &self,
        key: &IdempotencyKey,
        amount: Amount,
        payer: UserId,
    ) -> Result<ProcessorReceipt, ProcessorError> {
        self.execute(OperationKind::Refund, key, amount, payer).await
    }
}
