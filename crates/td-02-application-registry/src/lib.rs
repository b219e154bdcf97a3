//! # TD-02 Application Registry
//!
//! Applications to open projects and the candidate list a creator chooses
//! from.
//!
//! **Component ID:** 2
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Rules
//!
//! | Rule | Error |
//! |------|-------|
//! | One live application per (project, applicant) | `DuplicateApplication` |
//! | Only Open projects accept applications | `ProjectNotOpen` |
//! | Owners cannot apply to their own project | `SelfApplication` |
//! | Only pending applications can be selected | `ApplicantUnavailable` |
//! | At most one selected application per project | enforced by `commit_selection` |
//!
//! A withdrawn application re-opens in place when the applicant applies
//! again. Withdrawing anything that is not pending is a no-op.
//!
//! ## Module Structure
//!
//! ```text
//! td-02-application-registry/
//! ├── domain/          # Application, ApplicationStatus, Candidate, errors
//! ├── ports/           # ApplicationRegistryApi, ApplicationRepository, CandidateProfileSource
//! ├── adapters/        # InMemoryApplicationRepository
//! └── service.rs       # ApplicationRegistry
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryApplicationRepository;
pub use config::RegistryConfig;
pub use domain::{
    invariant_can_apply, invariant_single_selection, Application, ApplicationStatus, Candidate,
    CandidateProfile, RegistryError, SelectionOutcome,
};
pub use ports::{ApplicationRegistryApi, ApplicationRepository, CandidateProfileSource};
pub use service::ApplicationRegistry;
