//! # Value Objects
//!
//! Validated star values and tagged comments.

use super::errors::RatingError;
use serde::{Deserialize, Serialize};

/// Longest accepted comment body, in characters.
pub const MAX_COMMENT_CHARS: usize = 1_000;

/// A star value in `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, RatingError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(RatingError::InvalidStars(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

/// What a comment is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentTag {
    Communication,
    Quality,
    Timeliness,
    Professionalism,
    Other,
}

/// Optional free-text remark attached to a rating.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingComment {
    pub tag: CommentTag,
    pub text: String,
}

impl RatingComment {
    pub fn new(tag: CommentTag, text: impl Into<String>) -> Result<Self, RatingError> {
        let text = text.into();
        let len = text.chars().count();
        if len > MAX_COMMENT_CHARS {
            return Err(RatingError::CommentTooLong {
                len,
                max: MAX_COMMENT_CHARS,
            });
        }
        Ok(Self { tag, text })
    }
}
