use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use thiserror::Error;

/// Errors surfaced by a document collection
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Unexpected store response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Single-field ordering for `find`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub descending: bool,
}

impl SortOrder {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self { field: field.into(), descending: false }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self { field: field.into(), descending: true }
    }
}

/// Result of an `update_one` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    pub matched: u64,
    /// Set when the update inserted a new document
    pub upserted_id: Option<ObjectId>,
}

impl UpdateOutcome {
    pub fn upserted(&self) -> bool {
        self.upserted_id.is_some()
    }
}

/// A named collection of schemaless documents.
///
/// Filters are plain equality documents (`{ "field": value }`). Inserted
/// documents without an `_id` receive a freshly generated ObjectId.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Insert one document and return its `_id`
    async fn insert_one(&self, document: Document) -> Result<ObjectId, DatabaseError>;

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, DatabaseError>;

    async fn find(&self, filter: Document, sort: Option<SortOrder>) -> Result<Vec<Document>, DatabaseError>;

    /// Apply `set` as a `$set` to the first document matching `filter`.
    /// With `upsert`, a missing document is created from `filter` + `set`.
    async fn update_one(
        &self,
        filter: Document,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, DatabaseError>;

    /// Remove the first document matching `filter`; returns the deleted count
    async fn delete_one(&self, filter: Document) -> Result<u64, DatabaseError>;

    /// Enforce uniqueness of `field` across the collection
    async fn ensure_unique(&self, field: &str) -> Result<(), DatabaseError>;
}

/// Make sure a document carries an `_id`, generating one when absent
pub(crate) fn assign_id(document: &mut Document) -> Result<ObjectId, DatabaseError> {
    match document.get("_id") {
        None => {
            let id = ObjectId::new();
            document.insert("_id", id);
            Ok(id)
        }
        Some(existing) => existing
            .as_object_id()
            .ok_or_else(|| DatabaseError::UnexpectedResponse(format!("non-ObjectId _id: {}", existing))),
    }
}
