// handlers/utils.rs - Shared single-document operations
//
// Every resource follows the same shape: one store call, then absence maps to
// 404 and success to the envelope. These helpers hold that shape once.

use mongodb::bson::{doc, oid::ObjectId, Document};
use serde_json::Value;

use crate::api::format::document_to_json;
use crate::database::DocumentCollection;
use crate::error::ApiError;
use crate::middleware::{AckResult, ApiAck};

/// Parse a path id in the store's native format.
///
/// A malformed id is a client error (400), distinct from an unknown one (404).
pub fn parse_object_id(id: &str, resource: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::bad_request(format!("Invalid {} id", resource)))
}

/// Insert a new document and return it as stored, `_id` first
pub async fn insert_document(
    collection: &dyn DocumentCollection,
    document: Document,
) -> Result<Value, ApiError> {
    let mut stored = doc! { "_id": ObjectId::new() };
    for (key, value) in document {
        stored.insert(key, value);
    }

    collection.insert_one(stored.clone()).await?;
    Ok(document_to_json(&stored))
}

/// Look up exactly one document or answer 404
pub async fn fetch_one(
    collection: &dyn DocumentCollection,
    filter: Document,
    label: &str,
) -> Result<Value, ApiError> {
    match collection.find_one(filter).await? {
        Some(document) => Ok(document_to_json(&document)),
        None => Err(ApiError::not_found(format!("{} not found", label))),
    }
}

/// `$set` the given fields on one existing document
pub async fn apply_update(
    collection: &dyn DocumentCollection,
    filter: Document,
    set: Document,
    label: &str,
) -> AckResult {
    let outcome = collection.update_one(filter, set, false).await?;
    if outcome.matched == 0 {
        return Err(ApiError::not_found(format!("{} not found", label)));
    }
    Ok(ApiAck)
}

/// Remove one existing document
pub async fn remove_one(
    collection: &dyn DocumentCollection,
    filter: Document,
    label: &str,
) -> AckResult {
    let deleted = collection.delete_one(filter).await?;
    if deleted == 0 {
        return Err(ApiError::not_found(format!("{} not found", label)));
    }
    Ok(ApiAck)
}
