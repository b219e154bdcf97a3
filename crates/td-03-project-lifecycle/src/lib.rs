//! # TD-03 Project Lifecycle
//!
//! The project state machine. Owns project status and drives every other
//! component through it.
//!
//! **Component ID:** 3
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## State Machine
//!
//! ```text
//! [Draft] ──publish──→ [Open] ──select──→ [InProgress] ──submit──→ [InReview] ──approve──→ [Completed]
//!                         │                   ↑    │                  │    │
//!                         │                   └────┼───revision───────┘    │
//!                         └───────────cancel───────┴─────────────────────────┴──→ [Cancelled]
//! ```
//!
//! ## Side Effects per Transition
//!
//! | Transition | Escrow | Registry | Events |
//! |------------|--------|----------|--------|
//! | publish | - | - | status |
//! | select | hold | select one, close rest | status, chat on, selected, closed, paymentHeld |
//! | submit / revision | - | - | status, deliverySubmitted / revisionRequested |
//! | approve | release | - | status, chat off, completed, paymentReleased, rating prompts |
//! | cancel | refund (if held) | close pending (from Open) | status, chat off, cancelled, paymentRefunded |
//! | settle dispute | partial release | - | status, chat off, cancelled, payment split |
//!
//! A failed escrow call leaves the project exactly as it was.
//!
//! ## Module Structure
//!
//! ```text
//! td-03-project-lifecycle/
//! ├── domain/          # Project, ProjectDraft, LifecycleError, invariants
//! ├── ports/           # ProjectLifecycleApi, ProjectRepository
//! ├── adapters/        # In-memory repository, directory and profile views
//! └── service.rs       # ProjectLifecycleService
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryProjectRepository, MarketplaceProfileSource, RepositoryDirectory};
pub use config::LifecycleConfig;
pub use domain::{
    invariant_selection_consistency, invariant_valid_listing, DisputeSettlement, LifecycleError,
    Project, ProjectDraft,
};
pub use ports::{ProjectLifecycleApi, ProjectRepository};
pub use service::{LifecycleDependencies, ProjectLifecycleService};
