//! MongoDB-backed review store.
//!
//! Documents are decoded into an explicit field set on every read; anything
//! that does not match the layout below is reported as an error instead of
//! being passed through.
//!
//! ```text
//! { _id: ObjectId, film_id: string, user_id: string, text: string, rating: int | null }
//! ```

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use super::{ReviewStore, StoreError};
use crate::models::{Review, ReviewFromDb, ReviewId};

const DUPLICATE_KEY_CODE: i32 = 11000;
const UNIQUE_INDEX_NAME: &str = "uniq_film_user";

#[derive(Debug, Serialize, Deserialize)]
struct ReviewDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    film_id: String,
    user_id: String,
    text: String,
    #[serde(default)]
    rating: Option<i32>,
}

impl ReviewDocument {
    fn from_review(review: &Review) -> Self {
        Self {
            id: None,
            film_id: review.film_id.clone(),
            user_id: review.user_id.clone(),
            text: review.text.clone(),
            rating: review.rating.map(i32::from),
        }
    }

    fn into_review_from_db(self) -> Result<ReviewFromDb, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::Malformed("missing _id".into()))?;
        let rating = self
            .rating
            .map(u8::try_from)
            .transpose()
            .map_err(|_| StoreError::Malformed(format!("rating out of range in review {id}")))?;
        let review = Review { film_id: self.film_id, user_id: self.user_id, text: self.text, rating };
        Ok(ReviewFromDb::from_review(ReviewId::from(id), review))
    }
}

fn decode(document: Document) -> Result<ReviewFromDb, StoreError> {
    bson::from_document::<ReviewDocument>(document)?.into_review_from_db()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}

fn duplicate_or_mongo(err: mongodb::error::Error, review: &Review) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::Duplicate { film_id: review.film_id.clone(), user_id: review.user_id.clone() }
    } else {
        StoreError::Mongo(err)
    }
}

/// Review store over a `mongodb` collection handle. The handle is pooled and
/// cheap to clone, so the store is shared across requests without locking.
#[derive(Clone)]
pub struct MongoReviewStore {
    database: Database,
    collection: Collection<Document>,
}

impl MongoReviewStore {
    #[must_use]
    pub fn new(database: &Database, collection_name: &str) -> Self {
        Self { database: database.clone(), collection: database.collection::<Document>(collection_name) }
    }

    /// Create the compound unique index on `(film_id, user_id)`.
    ///
    /// Failure is non-fatal: the service still runs its existence check, so
    /// the index only narrows the check-then-insert window.
    pub async fn ensure_unique_index(&self) {
        let index = IndexModel::builder()
            .keys(doc! { "film_id": 1, "user_id": 1 })
            .options(IndexOptions::builder().unique(true).name(UNIQUE_INDEX_NAME.to_string()).build())
            .build();

        match self.collection.create_index(index, None).await {
            Ok(_) => tracing::info!(index = UNIQUE_INDEX_NAME, "review unique index ready"),
            Err(e) => tracing::warn!(error = %e, index = UNIQUE_INDEX_NAME, "failed to create review unique index"),
        }
    }
}

#[async_trait]
impl ReviewStore for MongoReviewStore {
    async fn find_page(&self, skip: u64, limit: u32) -> Result<Vec<ReviewFromDb>, StoreError> {
        let options = FindOptions::builder()
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(i64::from(limit))
            .build();

        let documents: Vec<Document> = self
            .collection
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(decode).collect()
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<ReviewFromDb>, StoreError> {
        self.collection
            .find_one(doc! { "_id": id.object_id() }, None)
            .await?
            .map(decode)
            .transpose()
    }

    async fn find_by_film_and_user(&self, film_id: &str, user_id: &str) -> Result<Option<ReviewFromDb>, StoreError> {
        self.collection
            .find_one(doc! { "film_id": film_id, "user_id": user_id }, None)
            .await?
            .map(decode)
            .transpose()
    }

    async fn insert(&self, review: &Review) -> Result<ReviewId, StoreError> {
        let document = bson::to_document(&ReviewDocument::from_review(review))?;
        let result = self
            .collection
            .insert_one(document, None)
            .await
            .map_err(|e| duplicate_or_mongo(e, review))?;

        result
            .inserted_id
            .as_object_id()
            .map(ReviewId::from)
            .ok_or_else(|| StoreError::UnexpectedId(result.inserted_id.to_string()))
    }

    async fn set_fields(&self, id: ReviewId, review: &Review) -> Result<u64, StoreError> {
        // `_id` is skipped when unset, so it never lands in `$set`.
        let fields = bson::to_document(&ReviewDocument::from_review(review))?;
        let result = self
            .collection
            .update_one(doc! { "_id": id.object_id() }, doc! { "$set": fields }, None)
            .await
            .map_err(|e| duplicate_or_mongo(e, review))?;
        Ok(result.modified_count)
    }

    async fn delete(&self, id: ReviewId) -> Result<u64, StoreError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.object_id() }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
