// handlers/classrooms.rs - /classrooms handlers
//
// classCode uniqueness is enforced by the unique index on the collection, not
// by a lookup before the insert, so two concurrent creates with the same code
// cannot both succeed.

use axum::extract::State;
use mongodb::bson::{doc, DateTime};
use serde_json::{json, Map, Value};

use crate::api::format::{document_to_json, documents_to_json};
use crate::error::ApiError;
use crate::middleware::{AckResult, ApiResponse, ApiResult, JsonBody, PathParam};
use crate::models::{update_document, validate_class_code, CreateClassroom, JoinClassroom, SYSTEM_FIELDS};
use crate::state::AppState;

use super::utils::{apply_update, fetch_one, insert_document, parse_object_id, remove_one};

fn duplicate_code(err: ApiError) -> ApiError {
    match err {
        ApiError::Conflict(_) => ApiError::conflict("A classroom with this classCode already exists"),
        other => other,
    }
}

/// GET /classrooms - List all classrooms in storage order
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let collections = state.collections()?;
    let documents = collections.classrooms.find(doc! {}, None).await?;
    Ok(ApiResponse::success(documents_to_json(&documents)))
}

/// POST /classrooms - Create a classroom with a unique 6-character classCode
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateClassroom>,
) -> ApiResult<Value> {
    let document = input.into_document(DateTime::now())?;

    let collections = state.collections()?;
    let stored = insert_document(collections.classrooms.as_ref(), document)
        .await
        .map_err(duplicate_code)?;
    Ok(ApiResponse::created(stored))
}

/// GET /classrooms/:id - Get a single classroom
pub async fn get(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Value> {
    let id = parse_object_id(&id, "classroom")?;

    let collections = state.collections()?;
    let classroom = fetch_one(collections.classrooms.as_ref(), doc! { "_id": id }, "Classroom").await?;
    Ok(ApiResponse::success(classroom))
}

/// PUT /classrooms/:id - Merge the given fields into a classroom
pub async fn update(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AckResult {
    let id = parse_object_id(&id, "classroom")?;
    let mut set = update_document(&payload, SYSTEM_FIELDS)?;

    if let Some(code) = payload.get("classCode") {
        validate_class_code(code.as_str().unwrap_or_default())?;
    }
    set.insert("updatedAt", DateTime::now());

    let collections = state.collections()?;
    apply_update(collections.classrooms.as_ref(), doc! { "_id": id }, set, "Classroom")
        .await
        .map_err(duplicate_code)
}

/// DELETE /classrooms/:id - Delete a classroom
pub async fn delete(State(state): State<AppState>, PathParam(id): PathParam<String>) -> AckResult {
    let id = parse_object_id(&id, "classroom")?;

    let collections = state.collections()?;
    remove_one(collections.classrooms.as_ref(), doc! { "_id": id }, "Classroom").await
}

/**
 * POST /classrooms/join - Look up a classroom by its code
 *
 * Membership is not recorded anywhere and `memberCount` is left untouched;
 * the response only returns the classroom and echoes the display name.
 */
pub async fn join(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<JoinClassroom>,
) -> ApiResult<Value> {
    let class_code = input.class_code()?;

    let collections = state.collections()?;
    let classroom = collections
        .classrooms
        .find_one(doc! { "classCode": class_code })
        .await?
        .ok_or_else(|| ApiError::not_found("Classroom not found"))?;

    Ok(ApiResponse::success(json!({
        "classroom": document_to_json(&classroom),
        "displayName": input.display_name,
    })))
}
