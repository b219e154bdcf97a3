//! # Algorithms
//!
//! Processor call discipline.

pub mod retry;

pub use retry::call_with_retry;
