//! In-memory `ReviewStore` for tests.
//!
//! Mirrors the driver's counter semantics (`$set` with identical values
//! modifies nothing) and keeps documents ordered by identifier. Individual
//! operations can be made to fail once to exercise error paths.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ReviewStore, StoreError};
use crate::models::{Review, ReviewFromDb, ReviewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    FindPage,
    FindById,
    FindByFilmAndUser,
    Insert,
    SetFields,
    Delete,
    Ping,
}

#[derive(Default)]
pub struct MemoryReviewStore {
    docs: Mutex<BTreeMap<ReviewId, Review>>,
    failures: Mutex<Vec<(Op, StoreError)>>,
    /// When set, `insert` and `set_fields` reject a second review for the same
    /// film/user pair.
    pub unique: bool,
}

impl MemoryReviewStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_unique_index() -> Self {
        Self { unique: true, ..Self::default() }
    }

    /// Make the next call to `op` fail with `err`.
    pub fn fail_next(&self, op: Op, err: StoreError) {
        self.failures.lock().unwrap().push((op, err));
    }

    /// Insert a document directly, bypassing any uniqueness rule.
    pub fn seed(&self, review: Review) -> ReviewId {
        let id = ReviewId::new();
        self.docs.lock().unwrap().insert(id, review);
        id
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    pub fn count_for(&self, film_id: &str, user_id: &str) -> usize {
        self.docs
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.film_id == film_id && r.user_id == user_id)
            .count()
    }

    fn take_failure(&self, op: Op) -> Result<(), StoreError> {
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(o, _)| *o == op) {
            Some(idx) => Err(failures.remove(idx).1),
            None => Ok(()),
        }
    }
}

/// Transport-level failure as the driver would report it.
#[must_use]
pub fn connection_error() -> StoreError {
    StoreError::Mongo(mongodb::error::Error::from(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    )))
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn find_page(&self, skip: u64, limit: u32) -> Result<Vec<ReviewFromDb>, StoreError> {
        self.take_failure(Op::FindPage)?;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .skip(skip)
            .take(limit as usize)
            .map(|(id, review)| ReviewFromDb::from_review(*id, review.clone()))
            .collect())
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<ReviewFromDb>, StoreError> {
        self.take_failure(Op::FindById)?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .get(&id)
            .map(|review| ReviewFromDb::from_review(id, review.clone())))
    }

    async fn find_by_film_and_user(&self, film_id: &str, user_id: &str) -> Result<Option<ReviewFromDb>, StoreError> {
        self.take_failure(Op::FindByFilmAndUser)?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .find(|(_, r)| r.film_id == film_id && r.user_id == user_id)
            .map(|(id, review)| ReviewFromDb::from_review(*id, review.clone())))
    }

    async fn insert(&self, review: &Review) -> Result<ReviewId, StoreError> {
        self.take_failure(Op::Insert)?;
        if self.unique && self.count_for(&review.film_id, &review.user_id) > 0 {
            return Err(StoreError::Duplicate { film_id: review.film_id.clone(), user_id: review.user_id.clone() });
        }
        Ok(self.seed(review.clone()))
    }

    async fn set_fields(&self, id: ReviewId, review: &Review) -> Result<u64, StoreError> {
        self.take_failure(Op::SetFields)?;
        let mut docs = self.docs.lock().unwrap();
        if self.unique
            && docs
                .iter()
                .any(|(other, r)| *other != id && r.film_id == review.film_id && r.user_id == review.user_id)
        {
            return Err(StoreError::Duplicate { film_id: review.film_id.clone(), user_id: review.user_id.clone() });
        }
        match docs.get_mut(&id) {
            Some(current) if current != review => {
                *current = review.clone();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete(&self, id: ReviewId) -> Result<u64, StoreError> {
        self.take_failure(Op::Delete)?;
        Ok(u64::from(self.docs.lock().unwrap().remove(&id).is_some()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.take_failure(Op::Ping)
    }
}
