//! # Domain Invariants
//!
//! The visibility rule.

/// Invariant: visibility is reduced only for users with at least one rating
/// whose window average is strictly below the threshold.
pub fn invariant_visibility(window_count: usize, average: Option<f64>, threshold: f64) -> bool {
    window_count >= 1 && average.is_some_and(|avg| avg < threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ratings_never_flagged() {
        assert!(!invariant_visibility(0, None, 3.0));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!invariant_visibility(5, Some(3.0), 3.0));
        assert!(invariant_visibility(5, Some(2.99), 3.0));
        assert!(invariant_visibility(1, Some(1.0), 3.0));
    }
}
