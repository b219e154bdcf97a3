//! # TD-04 Rating Collector
//!
//! The two-way rating exchange that closes a completed project.
//!
//! **Component ID:** 4
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Flow
//!
//! ```text
//! approve ──→ prompt_ratings ──→ ratingPrompt (creator, provider)
//!                                     │
//!              record_rating ←────────┘
//!                   │
//!                   ├──→ store (write-once per project and rater)
//!                   └──→ ReputationGuard::recompute(ratee)
//! ```
//!
//! | Check | Error |
//! |-------|-------|
//! | Project exists | `ProjectNotFound` |
//! | Project is Completed | `ProjectNotCompleted` |
//! | Rater is creator or provider | `InvalidRater` |
//! | Ratee is the rater's counterparty | `InvalidRatee` |
//! | Stars in 1..=5 | `InvalidStars` |
//! | First rating by this rater | `DuplicateRating` |
//!
//! ## Module Structure
//!
//! ```text
//! td-04-rating-collector/
//! ├── domain/          # Rating, Stars, RatingComment, RatingPrompt, errors
//! ├── ports/           # RatingCollectorApi, RatingRepository, ProjectDirectory
//! ├── adapters/        # InMemoryRatingRepository (also a RatingSource)
//! └── service.rs       # RatingCollector
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryRatingRepository;
pub use domain::{
    invariant_rating_parties, CommentTag, NewRating, Rating, RatingComment, RatingError,
    RatingPrompt, Stars,
};
pub use ports::{ProjectDirectory, RatingCollectorApi, RatingRepository};
pub use service::RatingCollector;
