//! # Value Objects

use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// One rating as seen from the ratee's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedRating {
    /// Star value, 1 to 5.
    pub stars: u8,
    pub created_at: Timestamp,
    /// Insertion order; breaks timestamp ties (higher is newer).
    pub sequence: u64,
}
