// handlers/notes.rs - /notes handlers

use axum::extract::State;
use mongodb::bson::{doc, DateTime};
use serde_json::{Map, Value};

use crate::api::format::documents_to_json;
use crate::database::SortOrder;
use crate::middleware::{AckResult, ApiResponse, ApiResult, JsonBody, PathParam};
use crate::models::{update_document, CreateNote, SYSTEM_FIELDS};
use crate::state::AppState;

use super::utils::{apply_update, fetch_one, insert_document, parse_object_id, remove_one};

/// GET /notes - List all notes, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let collections = state.collections()?;
    let documents = collections
        .notes
        .find(doc! {}, Some(SortOrder::descending("createdAt")))
        .await?;
    Ok(ApiResponse::success(documents_to_json(&documents)))
}

/**
 * POST /notes - Create a study note
 *
 * Requires `title`, one of `subject`/`courseId`/`courseTitle`, and at least
 * one attachment with a secure URL or a top-level `fileUrl`. The course
 * reference is stored as given and never checked against `courses`.
 */
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateNote>,
) -> ApiResult<Value> {
    let document = input.into_document(DateTime::now())?;

    let collections = state.collections()?;
    let stored = insert_document(collections.notes.as_ref(), document).await?;
    Ok(ApiResponse::created(stored))
}

/// GET /notes/:id - Get a single note
pub async fn get(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Value> {
    let id = parse_object_id(&id, "note")?;

    let collections = state.collections()?;
    let note = fetch_one(collections.notes.as_ref(), doc! { "_id": id }, "Note").await?;
    Ok(ApiResponse::success(note))
}

/// PUT /notes/:id - Merge the given fields into a note
pub async fn update(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AckResult {
    let id = parse_object_id(&id, "note")?;
    let mut set = update_document(&payload, SYSTEM_FIELDS)?;
    set.insert("updatedAt", DateTime::now());

    let collections = state.collections()?;
    apply_update(collections.notes.as_ref(), doc! { "_id": id }, set, "Note").await
}

/// DELETE /notes/:id - Delete a note
pub async fn delete(State(state): State<AppState>, PathParam(id): PathParam<String>) -> AckResult {
    let id = parse_object_id(&id, "note")?;

    let collections = state.collections()?;
    remove_one(collections.notes.as_ref(), doc! { "_id": id }, "Note").await
}
