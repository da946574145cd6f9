// handlers/courses.rs - /courses handlers

use axum::extract::State;
use mongodb::bson::{doc, DateTime};
use serde_json::{Map, Value};

use crate::api::format::documents_to_json;
use crate::middleware::{AckResult, ApiResponse, ApiResult, JsonBody, PathParam};
use crate::models::{update_document, CreateCourse, SYSTEM_FIELDS};
use crate::state::AppState;

use super::utils::{apply_update, fetch_one, insert_document, parse_object_id, remove_one};

/// GET /courses - List all courses in storage order
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let collections = state.collections()?;
    let documents = collections.courses.find(doc! {}, None).await?;
    Ok(ApiResponse::success(documents_to_json(&documents)))
}

/// POST /courses - Create a course (title and faculty required)
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCourse>,
) -> ApiResult<Value> {
    let document = input.into_document(DateTime::now())?;

    let collections = state.collections()?;
    let stored = insert_document(collections.courses.as_ref(), document).await?;
    Ok(ApiResponse::created(stored))
}

/// GET /courses/:id - Get a single course
pub async fn get(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Value> {
    let id = parse_object_id(&id, "course")?;

    let collections = state.collections()?;
    let course = fetch_one(collections.courses.as_ref(), doc! { "_id": id }, "Course").await?;
    Ok(ApiResponse::success(course))
}

/// PUT /courses/:id - Merge the given fields into a course
pub async fn update(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AckResult {
    let id = parse_object_id(&id, "course")?;
    let mut set = update_document(&payload, SYSTEM_FIELDS)?;
    set.insert("updatedAt", DateTime::now());

    let collections = state.collections()?;
    apply_update(collections.courses.as_ref(), doc! { "_id": id }, set, "Course").await
}

/// DELETE /courses/:id - Delete a course; its notes are left in place
pub async fn delete(State(state): State<AppState>, PathParam(id): PathParam<String>) -> AckResult {
    let id = parse_object_id(&id, "course")?;

    let collections = state.collections()?;
    remove_one(collections.courses.as_ref(), doc! { "_id": id }, "Course").await
}
