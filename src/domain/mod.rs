//! Domain types for the catalog with strong typing.
//!
//! Newtype ids keep title, review and comment identifiers from being mixed up,
//! and [`Score`] carries the 1..=10 bound in the type.

pub mod display;
pub mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                debug_assert!(id >= 0, concat!(stringify!($name), " should be non-negative"));
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = i32::deserialize(deserializer)?;
                Ok(Self::new(id))
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a catalogued title.
    ///
    /// ```rust
    /// use yamdb::domain::TitleId;
    ///
    /// let id = TitleId::new(42);
    /// assert_eq!(id.value(), 42);
    /// assert_eq!(id.to_string(), "42");
    /// ```
    TitleId
);

entity_id!(
    /// Unique identifier for a review.
    ReviewId
);

entity_id!(
    /// Unique identifier for a comment on a review.
    CommentId
);

/// A review score, always within `Score::MIN..=Score::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("Ensure this value is greater than or equal to {min} (got {value})", min = Score::MIN)]
    BelowMin { value: i32 },

    #[error("Ensure this value is less than or equal to {max} (got {value})", max = Score::MAX)]
    AboveMax { value: i32 },
}

impl Score {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 10;

    /// Applied when a review is created without a score.
    pub const DEFAULT: Self = Self(10);

    #[must_use]
    pub const fn value(&self) -> i16 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for Score {
    type Error = ScoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value < i32::from(Self::MIN) {
            return Err(ScoreError::BelowMin { value });
        }
        if value > i32::from(Self::MAX) {
            return Err(ScoreError::AboveMax { value });
        }
        // bounded above, cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(value as i16))
    }
}

impl From<Score> for i16 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_id_conversions() {
        let id = TitleId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(TitleId::from(42), id);
    }

    #[test]
    fn review_id_serialization() {
        let id = ReviewId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let deserialized: ReviewId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn score_accepts_closed_range() {
        for value in 1..=10 {
            let score = Score::try_from(value).unwrap();
            assert_eq!(i32::from(score.value()), value);
        }
    }

    #[test]
    fn score_rejects_out_of_range_and_names_the_bound() {
        assert_eq!(Score::try_from(0), Err(ScoreError::BelowMin { value: 0 }));
        assert_eq!(Score::try_from(-3), Err(ScoreError::BelowMin { value: -3 }));
        assert_eq!(Score::try_from(11), Err(ScoreError::AboveMax { value: 11 }));

        let message = Score::try_from(11).unwrap_err().to_string();
        assert!(message.contains("less than or equal to 10"));
    }

    #[test]
    fn score_defaults_to_ten() {
        assert_eq!(Score::default().value(), 10);
    }
}
