//! # Domain Invariants
//!
//! Consistency rules checked before a project is persisted.

use super::entities::Project;
use super::errors::LifecycleError;
use crate::config::LifecycleConfig;
use shared_types::{Amount, ProjectStatus};

/// Invariant: the selected applicant and the escrow transaction are either
/// both set or both unset, and they are set exactly when the project is past
/// selection (a project cancelled from Open has neither).
pub fn invariant_selection_consistency(project: &Project) -> Result<(), LifecycleError> {
    let violation = |detail: &str| LifecycleError::InvariantViolation {
        project: project.id,
        detail: detail.to_string(),
    };

    match (project.provider.is_some(), project.escrow_tx.is_some()) {
        (true, false) => return Err(violation("provider without escrow")),
        (false, true) => return Err(violation("escrow without provider")),
        _ => {}
    }
    if project.provider.is_some() != project.selected_application.is_some() {
        return Err(violation("provider without selected application"));
    }
    let selected = project.provider.is_some();
    let requires_selection = matches!(
        project.status,
        ProjectStatus::InProgress | ProjectStatus::InReview | ProjectStatus::Completed
    );
    if requires_selection && !selected {
        return Err(violation("active project without provider"));
    }
    if matches!(project.status, ProjectStatus::Draft | ProjectStatus::Open) && selected {
        return Err(violation("provider assigned before selection"));
    }
    Ok(())
}

/// Invariant: title and budget are within the configured bounds.
pub fn invariant_valid_listing(
    title: &str,
    budget: Amount,
    config: &LifecycleConfig,
) -> Result<(), LifecycleError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LifecycleError::InvalidTitle("title is empty".into()));
    }
    let len = title.chars().count();
    if len > config.max_title_chars {
        return Err(LifecycleError::InvalidTitle(format!(
            "title has {} characters, max {}",
            len, config.max_title_chars
        )));
    }
    if budget < config.min_budget {
        return Err(LifecycleError::InvalidBudget(budget));
    }
    Ok(())
}
