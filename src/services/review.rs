//! Review service: paginated listing plus create, replace and delete.
//!
//! DESIGN
//! ======
//! A thin layer over `ReviewStore`. Each operation is one or two
//! single-document round trips with no in-process state, so one instance is
//! shared by every request through `AppState`.
//!
//! ERROR HANDLING
//! ==============
//! Only the internal-error paths of `get` and `add` are logged here. Faults
//! in the existence check, `update`, and `remove` surface as
//! `ReviewError::Store` without a service-level log line; the HTTP trace
//! layer records the resulting 500.
//!
//! TRADE-OFFS
//! ==========
//! Uniqueness per film/user is a check-then-insert and is not atomic. When
//! the store has the unique index, the losing insert comes back as a
//! duplicate and is reported as the same conflict.

use std::sync::Arc;

use crate::db::{ReviewStore, StoreError};
use crate::models::{Review, ReviewFromDb, ReviewIn, ReviewId};

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 50;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("{detail}")]
    Internal { detail: String },
    #[error("Review by user {user_id} for movie {film_id} already exist")]
    Conflict { user_id: String, film_id: String },
    #[error("Not found review {review_id} for {action}")]
    NotFound { review_id: String, action: &'static str },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result of a replace. `Unchanged` means the document exists but the
/// submitted fields were identical, so the store modified nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(ReviewFromDb),
    Unchanged,
}

impl UpdateOutcome {
    #[must_use]
    pub fn into_option(self) -> Option<ReviewFromDb> {
        match self {
            Self::Updated(review) => Some(review),
            Self::Unchanged => None,
        }
    }
}

pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
}

// =============================================================================
// OPERATIONS
// =============================================================================

impl ReviewService {
    #[must_use]
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// Page through all reviews in identifier order.
    ///
    /// `page_number` starts at 1; callers validate both arguments.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the store read fails.
    pub async fn get(&self, page_number: u32, per_page: u32) -> Result<Vec<ReviewFromDb>, ReviewError> {
        let skip = u64::from(page_number.saturating_sub(1)) * u64::from(per_page);

        self.store.find_page(skip, per_page).await.map_err(|e| {
            tracing::error!(error = %e, page_number, per_page, "error while getting reviews");
            ReviewError::Internal { detail: "Error while getting reviews".into() }
        })
    }

    /// Create a review for `user_id`, rejecting a second review of the same film.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the user already reviewed the film, `Internal`
    /// if the insert or read-back fails, and `Store` if the existence check
    /// itself fails.
    pub async fn add(&self, user_id: &str, data: ReviewIn) -> Result<ReviewFromDb, ReviewError> {
        let review = Review::from_input(data, user_id);
        let film_id = review.film_id.clone();

        if self.check_if_review_exist(&film_id, user_id).await?.is_some() {
            return Err(conflict(user_id, &film_id));
        }

        let new_id = match self.store.insert(&review).await {
            Ok(id) => id,
            Err(StoreError::Duplicate { .. }) => return Err(conflict(user_id, &film_id)),
            Err(e) => {
                tracing::error!(error = %e, %user_id, %film_id, "error while adding review");
                return Err(ReviewError::Internal {
                    detail: format!("Error while adding review by {user_id} for movie {film_id}"),
                });
            }
        };

        match self.store.find_by_id(new_id).await {
            Ok(Some(stored)) => Ok(stored),
            Ok(None) => {
                tracing::error!(review_id = %new_id, %user_id, %film_id, "inserted review not found on read-back");
                Err(ReviewError::Internal {
                    detail: format!("Error while adding review by {user_id} for movie {film_id}"),
                })
            }
            Err(e) => {
                tracing::error!(error = %e, review_id = %new_id, %user_id, %film_id, "error while reading back review");
                Err(ReviewError::Internal {
                    detail: format!("Error while adding review by {user_id} for movie {film_id}"),
                })
            }
        }
    }

    /// Replace every field of an existing review.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `review_id` is malformed or matches nothing, and
    /// `Conflict` if the new film/user pair already belongs to another
    /// review. Store faults propagate as `Store`.
    pub async fn update(&self, review_id: &str, data: Review) -> Result<UpdateOutcome, ReviewError> {
        let not_found = || ReviewError::NotFound { review_id: review_id.to_owned(), action: "update" };

        let id: ReviewId = review_id.parse().map_err(|_| not_found())?;
        if self.store.find_by_id(id).await?.is_none() {
            return Err(not_found());
        }

        let modified = match self.store.set_fields(id, &data).await {
            Ok(modified) => modified,
            Err(StoreError::Duplicate { .. }) => return Err(conflict(&data.user_id, &data.film_id)),
            Err(e) => return Err(e.into()),
        };

        if modified == 1 {
            // A concurrent delete between the write and this read lands here.
            return self
                .store
                .find_by_id(id)
                .await?
                .map(UpdateOutcome::Updated)
                .ok_or_else(not_found);
        }

        Ok(UpdateOutcome::Unchanged)
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` unless exactly one document was deleted; malformed
    /// and absent identifiers are not distinguished.
    pub async fn remove(&self, review_id: &str) -> Result<(), ReviewError> {
        let not_found = || ReviewError::NotFound { review_id: review_id.to_owned(), action: "deletion" };

        let id: ReviewId = review_id.parse().map_err(|_| not_found())?;
        if self.store.delete(id).await? != 1 {
            return Err(not_found());
        }
        Ok(())
    }

    /// Look up the review a user left for a film, if any.
    ///
    /// # Errors
    ///
    /// Propagates store faults unchanged.
    pub async fn check_if_review_exist(&self, film_id: &str, user_id: &str) -> Result<Option<ReviewFromDb>, ReviewError> {
        Ok(self.store.find_by_film_and_user(film_id, user_id).await?)
    }

    /// Round-trip to the store for health checks.
    ///
    /// # Errors
    ///
    /// Returns the store error if the ping fails.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

fn conflict(user_id: &str, film_id: &str) -> ReviewError {
    ReviewError::Conflict { user_id: user_id.to_owned(), film_id: film_id.to_owned() }
}

#[cfg(test)]
#[path = "review_test.rs"]
mod tests;
