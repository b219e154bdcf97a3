//! # Adapters
//!
//! Concrete implementations of the outbound ports.

pub mod processor;

pub use processor::{ExecutedOperation, InMemoryPaymentProcessor, OperationKind};
