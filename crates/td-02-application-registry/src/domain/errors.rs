//! # Domain Errors
//!
//! Error types for the Application Registry.

use super::value_objects::ApplicationStatus;
use shared_types::{ApplicationId, ProjectId, ProjectStatus, UserId};
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The applicant already has a live application on this project.
    #[error("Duplicate application by {applicant} on project {project}")]
    DuplicateApplication {
        /// Target project
        project: ProjectId,
        /// Applicant
        applicant: UserId,
    },

    /// Applications are only accepted while the project is Open.
    #[error("Project {project} is not open (status: {status})")]
    ProjectNotOpen {
        /// Target project
        project: ProjectId,
        /// Current status
        status: ProjectStatus,
    },

    /// Creators cannot apply to their own project.
    #[error("Owner cannot apply to own project {0}")]
    SelfApplication(ProjectId),

    /// Application not found.
    #[error("Application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    /// The application belongs to another project.
    #[error("Application {application} does not belong to project {project}")]
    ApplicationProjectMismatch {
        /// Application
        application: ApplicationId,
        /// Project it was presented for
        project: ProjectId,
    },

    /// The application can no longer be selected (withdrawn, closed, ...).
    #[error("Applicant unavailable: application {application} is {status:?}")]
    ApplicantUnavailable {
        /// Application
        application: ApplicationId,
        /// Its current status
        status: ApplicationStatus,
    },

    /// Invalid application status transition.
    #[error("Invalid application transition: {from} -> {to}")]
    InvalidApplicationState {
        /// Current status
        from: String,
        /// Attempted status
        to: String,
    },

    /// Cover letter exceeds the configured limit.
    #[error("Cover letter too long: {len} > {max} characters")]
    CoverLetterTooLong {
        /// Submitted length
        len: usize,
        /// Limit
        max: usize,
    },

    /// Profile service could not be reached.
    #[error("Profile unavailable: {0}")]
    ProfileUnavailable(String),
}
