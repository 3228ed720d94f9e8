//! Review persistence: the store seam and MongoDB bootstrap.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to connect to MongoDB, verify the connection, and
//! ensure collection indexes before accepting HTTP traffic. The service layer
//! only sees the `ReviewStore` trait, so tests swap in an in-memory store.

#[cfg(test)]
pub mod memory;
pub mod reviews;

use async_trait::async_trait;
use mongodb::Client;
use mongodb::bson::doc;

use crate::config::MongoConfig;
use crate::models::{Review, ReviewFromDb, ReviewId};
pub use reviews::MongoReviewStore;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("failed to decode review document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),
    #[error("failed to encode review document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),
    #[error("malformed review document: {0}")]
    Malformed(String),
    #[error("store returned a non-ObjectId identifier: {0}")]
    UnexpectedId(String),
    #[error("duplicate review for film {film_id} by user {user_id}")]
    Duplicate { film_id: String, user_id: String },
}

/// Single-document operations over the reviews collection.
///
/// Every method is one round trip. Counters mirror the driver's
/// `modified_count` / `deleted_count` so callers can infer what happened.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// All reviews ordered by ascending identifier, after skipping `skip`.
    async fn find_page(&self, skip: u64, limit: u32) -> Result<Vec<ReviewFromDb>, StoreError>;

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<ReviewFromDb>, StoreError>;

    async fn find_by_film_and_user(&self, film_id: &str, user_id: &str) -> Result<Option<ReviewFromDb>, StoreError>;

    /// Insert a new document and return the identifier the store assigned.
    async fn insert(&self, review: &Review) -> Result<ReviewId, StoreError>;

    /// `$set` every review field on the matching document. Returns the
    /// number of documents actually modified (0 when values are identical).
    async fn set_fields(&self, id: ReviewId, review: &Review) -> Result<u64, StoreError>;

    /// Returns the number of documents deleted.
    async fn delete(&self, id: ReviewId) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

// =============================================================================
// BOOTSTRAP
// =============================================================================

/// Connect to MongoDB, ping it, and prepare the reviews collection.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server is
/// unreachable. Index creation failures are logged and tolerated.
pub async fn init_database(config: &MongoConfig) -> Result<MongoReviewStore, StoreError> {
    let client = Client::with_uri_str(&config.url).await?;
    let database = client.database(&config.database);
    database.run_command(doc! { "ping": 1 }, None).await?;

    let store = MongoReviewStore::new(&database, &config.collection);
    if config.unique_index {
        store.ensure_unique_index().await;
    }

    tracing::info!(database = %config.database, collection = %config.collection, "connected to MongoDB");
    Ok(store)
}
