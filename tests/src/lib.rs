//! # Tudu Engine Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── engine_benchmarks.rs   # Reputation window, escrow custody
//! │
//! └── src/integration/
//!     ├── mod.rs                 # Shared harness (fast retries, manual clock)
//!     ├── flows.rs               # Project journeys across all five components
//!     └── concurrency.rs         # Races on selection, escrow, and ratings
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p td-tests
//!
//! # By category
//! cargo test -p td-tests integration::flows
//! cargo test -p td-tests integration::concurrency
//!
//! # Benchmarks
//! cargo bench -p td-tests
//! ```

#![allow(dead_code)]

pub mod integration;
