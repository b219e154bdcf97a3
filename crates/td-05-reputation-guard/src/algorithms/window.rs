//! # Rolling Window
//!
//! Selects the most recent ratings and averages them.

use crate::domain::ReceivedRating;
use std::cmp::Reverse;

/// The `window` most recent ratings, newest first.
///
/// Ordered by timestamp descending; equal timestamps fall back to insertion
/// order (later insertion is newer).
pub fn select_window(mut ratings: Vec<ReceivedRating>, window: usize) -> Vec<ReceivedRating> {
    ratings.sort_by_key(|r| Reverse((r.created_at, r.sequence)));
    ratings.truncate(window);
    ratings
}

/// Arithmetic mean of the star values, `None` for an empty slice.
pub fn rolling_average(ratings: &[ReceivedRating]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: u64 = ratings.iter().map(|r| u64::from(r.stars)).sum();
    Some(sum as f64 / ratings.len() as f64)
}
