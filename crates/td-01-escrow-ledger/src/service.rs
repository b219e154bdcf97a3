//! # Escrow Ledger Service
//!
//! Custody of project funds. Each project's transactions are kept oldest
//! first; the last one is current. A new hold is only possible once the
//! current transaction has settled.
//!
//! A capture that exhausts its retries unanswered is kept in doubt. The next
//! hold on the project replays it under the same key; a void replays it and
//! refunds it.

use crate::algorithms::call_with_retry;
use crate::config::EscrowConfig;
use crate::domain::{
    invariant_shares_match, EscrowAction, EscrowError, EscrowState, EscrowTransaction, HoldParams,
    IdempotencyKey, InDoubtHold,
};
use crate::ports::{EscrowLedgerApi, PaymentProcessor};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Amount, KeyedLocks, ProjectId, TimeSource, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// The escrow ledger.
pub struct EscrowLedger {
    config: EscrowConfig,
    processor: Arc<dyn PaymentProcessor>,
    time: Arc<dyn TimeSource>,
    transactions: RwLock<HashMap<ProjectId, Vec<EscrowTransaction>>>,
    in_doubt: RwLock<HashMap<ProjectId, InDoubtHold>>,
    locks: KeyedLocks<ProjectId>,
}

impl EscrowLedger {
    pub fn new(
        config: EscrowConfig,
        processor: Arc<dyn PaymentProcessor>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            processor,
            time,
            transactions: RwLock::new(HashMap::new()),
            in_doubt: RwLock::new(HashMap::new()),
            locks: KeyedLocks::new(),
        }
    }

    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    /// Amount currently in custody across all projects.
    pub fn total_in_custody(&self) -> Amount {
        self.transactions
            .read()
            .values()
            .filter_map(|txs| txs.last())
            .map(EscrowTransaction::remaining)
            .sum()
    }

    /// Drop lock slots no operation is holding or waiting on.
    pub fn prune_locks(&self) -> usize {
        self.locks.prune()
    }

    fn current(&self, project: ProjectId) -> Result<EscrowTransaction, EscrowError> {
        self.transactions
            .read()
            .get(&project)
            .and_then(|txs| txs.last())
            .cloned()
            .ok_or(EscrowError::NoEscrow(project))
    }

    fn next_ordinal(&self, project: ProjectId) -> u32 {
        self.transactions
            .read()
            .get(&project)
            .map_or(0, |txs| txs.len()) as u32
            + 1
    }

    /// Replace the current transaction with its settled form.
    fn commit(&self, tx: EscrowTransaction) {
        let mut transactions = self.transactions.write();
        if let Some(slot) = transactions
            .get_mut(&tx.project)
            .and_then(|txs| txs.last_mut())
        {
            *slot = tx;
        }
    }

    async fn pay_out(
        &self,
        tx: &EscrowTransaction,
        action: EscrowAction,
        amount: Amount,
    ) -> Result<String, EscrowError> {
        let key = IdempotencyKey::new(tx.project, action, tx.ordinal);
        let receipt = match action {
            EscrowAction::Release | EscrowAction::PartialRelease => {
                call_with_retry(&self.config.retry, &key, || {
                    self.processor.release(&key, amount, tx.payee)
                })
                .await?
            }
            _ => {
                call_with_retry(&self.config.retry, &key, || {
                    self.processor.refund(&key, amount, tx.payer)
                })
                .await?
            }
        };
        Ok(receipt.reference)
    }

    fn record(&self, tx: EscrowTransaction) {
        self.transactions
            .write()
            .entry(tx.project)
            .or_default()
            .push(tx);
    }

    /// Replay an in-doubt capture, then refund it. Caller holds the project lock.
    async fn void_locked(&self, pending: InDoubtHold) -> Result<EscrowTransaction, EscrowError> {
        let key = pending.capture_key();
        let capture = call_with_retry(&self.config.retry, &key, || {
            self.processor
                .authorize_capture(&key, pending.amount, pending.payer)
        })
        .await?;

        let mut tx = EscrowTransaction::held(HoldParams {
            project: pending.project,
            payer: pending.payer,
            payee: pending.payee,
            amount: pending.amount,
            ordinal: pending.ordinal,
            capture_reference: capture.reference,
            created_at: pending.since,
        });
        let reference = self
            .pay_out(&tx, EscrowAction::Refund, pending.amount)
            .await?;
        tx.settle(
            EscrowState::Refunded,
            0,
            pending.amount,
            vec![reference],
            self.time.now(),
        )?;

        self.record(tx.clone());
        self.in_doubt.write().remove(&pending.project);
        info!(
            project = %pending.project,
            tx = %tx.id,
            amount = pending.amount,
            ordinal = pending.ordinal,
            "In-doubt capture voided"
        );
        Ok(tx)
    }

    async fn settle_full(
        &self,
        project: ProjectId,
        next: EscrowState,
    ) -> Result<EscrowTransaction, EscrowError> {
        let _guard = self.locks.lock(&project).await;

        let mut tx = self.current(project)?;
        tx.ensure_can_transition(next)?;

        let amount = tx.held_amount;
        let (action, to_provider, to_creator) = match next {
            EscrowState::Released => (EscrowAction::Release, amount, 0),
            _ => (EscrowAction::Refund, 0, amount),
        };

        let reference = self.pay_out(&tx, action, amount).await.inspect_err(|e| {
            warn!(project = %project, action = action.as_str(), error = %e, "Escrow settlement not acknowledged");
        })?;

        tx.settle(next, to_provider, to_creator, vec![reference], self.time.now())?;
        self.commit(tx.clone());

        info!(
            project = %project,
            tx = %tx.id,
            state = ?tx.state,
            amount,
            "Escrow settled"
        );
        Ok(tx)
    }
}

#[async_trait]
impl EscrowLedgerApi for EscrowLedger {
    async fn hold(
        &self,
        project: ProjectId,
        payer: UserId,
        payee: UserId,
        amount: Amount,
    ) -> Result<EscrowTransaction, EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidAmount(amount));
        }

        let _guard = self.locks.lock(&project).await;

        if self
            .current(project)
            .is_ok_and(|tx| tx.state == EscrowState::Held)
        {
            return Err(EscrowError::EscrowAlreadyHeld(project));
        }

        let pending = self.in_doubt.read().get(&project).cloned();
        let ordinal = match pending {
            Some(pending) if pending.matches(payer, amount) => {
                info!(project = %project, ordinal = pending.ordinal, "Replaying in-doubt capture");
                pending.ordinal
            }
            Some(pending) => {
                // A different capture cannot reuse the key, so settle the old one first.
                self.void_locked(pending).await?;
                self.next_ordinal(project)
            }
            None => self.next_ordinal(project),
        };

        let key = IdempotencyKey::new(project, EscrowAction::Hold, ordinal);
        let receipt = match call_with_retry(&self.config.retry, &key, || {
            self.processor.authorize_capture(&key, amount, payer)
        })
        .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                if matches!(e, EscrowError::ProcessorUnavailable { .. }) {
                    warn!(project = %project, amount, ordinal, error = %e, "Escrow hold in doubt");
                    self.in_doubt.write().insert(
                        project,
                        InDoubtHold {
                            project,
                            payer,
                            payee,
                            amount,
                            ordinal,
                            since: self.time.now(),
                        },
                    );
                } else {
                    warn!(project = %project, amount, error = %e, "Escrow hold failed");
                }
                return Err(e);
            }
        };

        let tx = EscrowTransaction::held(HoldParams {
            project,
            payer,
            payee,
            amount,
            ordinal,
            capture_reference: receipt.reference,
            created_at: self.time.now(),
        });
        self.record(tx.clone());
        self.in_doubt.write().remove(&project);

        info!(
            project = %project,
            tx = %tx.id,
            amount,
            ordinal,
            "Escrow held"
        );
        Ok(tx)
    }

    async fn release(&self, project: ProjectId) -> Result<EscrowTransaction, EscrowError> {
        self.settle_full(project, EscrowState::Released).await
    }

    async fn refund(&self, project: ProjectId) -> Result<EscrowTransaction, EscrowError> {
        self.settle_full(project, EscrowState::Refunded).await
    }

    async fn partial_release(
        &self,
        project: ProjectId,
        provider_share: Amount,
        creator_share: Amount,
    ) -> Result<EscrowTransaction, EscrowError> {
        let _guard = self.locks.lock(&project).await;

        let mut tx = self.current(project)?;
        tx.ensure_can_transition(EscrowState::PartiallyReleased)?;
        invariant_shares_match(tx.held_amount, provider_share, creator_share)?;

        // Both legs must be acknowledged before anything is committed. A retry
        // after a half-acknowledged split replays the first leg by key.
        let mut references = Vec::with_capacity(2);
        if provider_share > 0 {
            references.push(
                self.pay_out(&tx, EscrowAction::PartialRelease, provider_share)
                    .await?,
            );
        }
        if creator_share > 0 {
            references.push(
                self.pay_out(&tx, EscrowAction::PartialRefund, creator_share)
                    .await?,
            );
        }

        tx.settle(
            EscrowState::PartiallyReleased,
            provider_share,
            creator_share,
            references,
            self.time.now(),
        )?;
        self.commit(tx.clone());

        info!(
            project = %project,
            tx = %tx.id,
            provider_share,
            creator_share,
            "Escrow split"
        );
        Ok(tx)
    }

    async fn void_in_doubt(
        &self,
        project: ProjectId,
    ) -> Result<Option<EscrowTransaction>, EscrowError> {
        let _guard = self.locks.lock(&project).await;
        let Some(pending) = self.in_doubt.read().get(&project).cloned() else {
            return Ok(None);
        };
        self.void_locked(pending)
            .await
            .inspect_err(|e| {
                warn!(project = %project, error = %e, "In-doubt capture not voided");
            })
            .map(Some)
    }

    fn in_doubt(&self, project: ProjectId) -> Option<InDoubtHold> {
        self.in_doubt.read().get(&project).cloned()
    }

    fn transaction(&self, project: ProjectId) -> Option<EscrowTransaction> {
        self.current(project).ok()
    }

    fn history(&self, project: ProjectId) -> Vec<EscrowTransaction> {
        self.transactions
            .read()
            .get(&project)
            .cloned()
            .unwrap_or_default()
    }
}
