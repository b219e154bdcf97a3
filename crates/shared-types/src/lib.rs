//! # Shared Types Crate
//!
//! Types that every engine component agrees on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers, amounts and the project status
//!   table are defined once, here.
//! - **Derived, not duplicated**: `ProjectSummary` and `ReputationSnapshot`
//!   are read models handed across crate boundaries; the owning crate is the
//!   only writer.
//! - **Explicit locking**: `KeyedLocks` is the per-entity mutual exclusion
//!   primitive used by the lifecycle and the escrow ledger.

pub mod entities;
pub mod errors;
pub mod locks;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use locks::KeyedLocks;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
