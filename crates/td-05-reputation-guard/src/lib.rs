//! # TD-05 Reputation Guard
//!
//! Derives a visibility signal from the ratings a user has received.
//!
//! **Component ID:** 5
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Rule
//!
//! | Input | Output |
//! |-------|--------|
//! | No ratings | no average, not flagged |
//! | 1..N ratings | mean of all of them |
//! | More than N | mean of the N most recent (timestamp desc, then insertion order) |
//! | Mean < threshold | `visibility_flag = true` |
//!
//! Defaults: `N = 5`, threshold `3.0`.
//!
//! Snapshots are rebuilt from the full history on every rating, never
//! patched incrementally, so a recompute that finds nothing new leaves the
//! stored snapshot (and its `recomputed_at` marker) untouched.
//!
//! ## Module Structure
//!
//! ```text
//! td-05-reputation-guard/
//! ├── domain/          # ReceivedRating, visibility invariant, errors
//! ├── algorithms/      # Window selection, rolling average
//! ├── ports/           # ReputationApi, RatingSource
//! └── service.rs       # ReputationGuard
//! ```

#![warn(clippy::all)]

pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::{rolling_average, select_window};
pub use config::ReputationConfig;
pub use domain::{invariant_visibility, ReceivedRating, ReputationError};
pub use ports::{RatingSource, ReputationApi};
pub use service::ReputationGuard;
