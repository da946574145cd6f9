// handlers/users.rs - /users handlers
//
// Users are keyed by the identity provider's uid, not by the store id, and
// carry no timestamps.

use axum::extract::State;
use mongodb::bson::doc;
use serde_json::{Map, Value};

use crate::api::format::{document_to_json, documents_to_json};
use crate::error::ApiError;
use crate::middleware::{AckResult, ApiResponse, ApiResult, JsonBody, PathParam};
use crate::models::{update_document, UpsertUser, USER_PROTECTED_FIELDS};
use crate::state::AppState;

use super::utils::{apply_update, fetch_one, remove_one};

/// GET /users - List all users
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let collections = state.collections()?;
    let documents = collections.users.find(doc! {}, None).await?;
    Ok(ApiResponse::success(documents_to_json(&documents)))
}

/**
 * POST /users - Create or refresh a user profile by uid
 *
 * Answers 201 when the uid was new and 200 when an existing profile was
 * overwritten; the body is the stored profile either way.
 */
pub async fn upsert(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UpsertUser>,
) -> ApiResult<Value> {
    let (filter, set) = input.into_upsert()?;

    let collections = state.collections()?;
    let outcome = collections.users.update_one(filter.clone(), set, true).await?;
    let stored = collections
        .users
        .find_one(filter)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let data = document_to_json(&stored);
    if outcome.upserted() {
        Ok(ApiResponse::created(data))
    } else {
        Ok(ApiResponse::success(data))
    }
}

/// GET /users/:uid - Get a user by identity id
pub async fn get(State(state): State<AppState>, PathParam(uid): PathParam<String>) -> ApiResult<Value> {
    let collections = state.collections()?;
    let user = fetch_one(collections.users.as_ref(), doc! { "uid": uid }, "User").await?;
    Ok(ApiResponse::success(user))
}

/// PUT /users/:uid - Merge the given profile fields
pub async fn update(
    State(state): State<AppState>,
    PathParam(uid): PathParam<String>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AckResult {
    let set = update_document(&payload, USER_PROTECTED_FIELDS)?;

    let collections = state.collections()?;
    apply_update(collections.users.as_ref(), doc! { "uid": uid }, set, "User").await
}

/// DELETE /users/:uid - Delete a user
pub async fn delete(State(state): State<AppState>, PathParam(uid): PathParam<String>) -> AckResult {
    let collections = state.collections()?;
    remove_one(collections.users.as_ref(), doc! { "uid": uid }, "User").await
}
