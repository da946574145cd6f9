// models/mod.rs - Per-endpoint input schemas
//
// Each create/upsert payload deserializes into a typed struct, is checked for
// required fields, and is turned into the document that gets stored. Unknown
// keys are ignored.

pub mod classroom;
pub mod course;
pub mod note;
pub mod user;

pub use classroom::{validate_class_code, CreateClassroom, JoinClassroom};
pub use course::CreateCourse;
pub use note::{byte_count, normalize_attachments, Attachment, CreateNote};
pub use user::{UpsertUser, USER_PROTECTED_FIELDS};

use mongodb::bson::Document;
use serde_json::{Map, Value};

use crate::api::format::json_object_to_document;
use crate::error::ApiError;

/// Fields a client may never write through `PUT`
pub const SYSTEM_FIELDS: &[&str] = &["_id", "createdAt"];

/// True when the value is present and not blank
pub(crate) fn present(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |s| !s.trim().is_empty())
}

/// Drop blank strings so they are stored as null
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Turn a `PUT` body into the `$set` document for a partial update.
///
/// Rejects an empty payload and any attempt to write a protected field.
pub fn update_document(payload: &Map<String, Value>, protected: &[&str]) -> Result<Document, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::bad_request("No fields provided to update"));
    }

    if let Some(field) = payload.keys().find(|key| protected.contains(&key.as_str())) {
        return Err(ApiError::bad_request(format!(
            "Field '{}' cannot be set via API",
            field
        )));
    }

    Ok(json_object_to_document(payload))
}
