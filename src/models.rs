//! Review data contracts.
//!
//! DESIGN
//! ======
//! Three shapes of the same record: `ReviewIn` is what a client submits,
//! `Review` adds the authenticated user, and `ReviewFromDb` adds the
//! store-assigned identifier. The stored document layout lives in
//! `db::reviews`; these types never carry raw BSON.

use std::fmt;
use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const MAX_TEXT_LEN: usize = 10_000;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

// =============================================================================
// IDENTIFIER
// =============================================================================

/// Store-assigned review identifier. Canonical form is 24 lowercase hex chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReviewId(ObjectId);

impl ReviewId {
    #[cfg(test)]
    #[must_use]
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    #[must_use]
    pub fn object_id(self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for ReviewId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl FromStr for ReviewId {
    type Err = mongodb::bson::oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s).map(Self)
    }
}

impl Serialize for ReviewId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReviewId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// CONTRACTS
// =============================================================================

/// Review fields as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIn {
    pub film_id: String,
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
}

/// Domain review: client fields plus the submitting user.
///
/// Also the replacement payload for updates; an `id` key in that payload is
/// ignored because the identifier is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub film_id: String,
    pub user_id: String,
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Review {
    #[must_use]
    pub fn from_input(data: ReviewIn, user_id: &str) -> Self {
        Self { film_id: data.film_id, user_id: user_id.to_owned(), text: data.text, rating: data.rating }
    }
}

/// Persisted review as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFromDb {
    pub id: ReviewId,
    pub film_id: String,
    pub user_id: String,
    pub text: String,
    pub rating: Option<u8>,
}

impl ReviewFromDb {
    #[must_use]
    pub fn from_review(id: ReviewId, review: Review) -> Self {
        Self { id, film_id: review.film_id, user_id: review.user_id, text: review.text, rating: review.rating }
    }

    /// Field set without the identifier.
    #[cfg(test)]
    #[must_use]
    pub fn fields(&self) -> Review {
        Review {
            film_id: self.film_id.clone(),
            user_id: self.user_id.clone(),
            text: self.text.clone(),
            rating: self.rating,
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("text must be at most {MAX_TEXT_LEN} characters")]
    TextTooLong,
    #[error("rating must be between {MIN_RATING} and {MAX_RATING}, got {0}")]
    RatingOutOfRange(u8),
}

impl ReviewIn {
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_content(&self.film_id, &self.text, self.rating)
    }
}

impl Review {
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::Empty("user_id"));
        }
        validate_content(&self.film_id, &self.text, self.rating)
    }
}

fn validate_content(film_id: &str, text: &str, rating: Option<u8>) -> Result<(), ValidationError> {
    if film_id.trim().is_empty() {
        return Err(ValidationError::Empty("film_id"));
    }
    if text.trim().is_empty() {
        return Err(ValidationError::Empty("text"));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TextTooLong);
    }
    match rating {
        Some(r) if !(MIN_RATING..=MAX_RATING).contains(&r) => Err(ValidationError::RatingOutOfRange(r)),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;
