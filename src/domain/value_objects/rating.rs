//! Review rating value object.

use serde::{Deserialize, Serialize};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 10;

/// A score on the 1..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Rating(i16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between {MIN_RATING} and {MAX_RATING}, got {0}")]
pub struct InvalidRating(pub i16);

impl Rating {
    pub fn new(value: i16) -> Result<Self, InvalidRating> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidRating(value))
        }
    }

    pub fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = InvalidRating;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}
