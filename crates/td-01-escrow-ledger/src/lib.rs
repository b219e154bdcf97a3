//! # TD-01 Escrow Ledger
//!
//! Custody of project funds between selection and settlement.
//!
//! **Component ID:** 1
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Hold the project budget after a provider is selected, then release it to
//! the provider, refund it to the creator, or split it between them:
//! - Every state change is committed only after the processor acknowledges
//! - Processor calls are timed, retried with backoff, and keyed for idempotency
//! - Operations on one project are serialized; projects never contend
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | Conservation | `released + refunded <= held`, checked before every commit |
//! | Monotonic state | `Held` is left exactly once, never re-entered |
//! | Single custody | At most one `Held` transaction per project |
//! | No double charge | Retries replay `{project}:{action}:{ordinal}` keys |
//! | No lost capture | An unanswered capture stays in doubt until replayed or voided |
//!
//! ## Module Structure
//!
//! ```text
//! td-01-escrow-ledger/
//! ├── domain/          # EscrowTransaction, EscrowState, IdempotencyKey, errors
//! ├── algorithms/      # Processor retry with timeout and backoff
//! ├── ports/           # EscrowLedgerApi, PaymentProcessor
//! ├── adapters/        # InMemoryPaymentProcessor
//! └── service.rs       # EscrowLedger
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryPaymentProcessor, OperationKind};
pub use algorithms::call_with_retry;
pub use config::{EscrowConfig, RetryPolicy};
pub use domain::{
    invariant_conservation, invariant_shares_match, EscrowAction, EscrowError, EscrowEvent,
    EscrowState, EscrowTransaction, IdempotencyKey, InDoubtHold,
};
pub use ports::{EscrowLedgerApi, PaymentProcessor, ProcessorError, ProcessorReceipt};
pub use service::EscrowLedger;
