// handlers/system.rs - Service descriptor, health check and route fallback

use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::error::ApiError;

/// GET / - Describe the service and its endpoints
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Classnotes API",
            "version": version,
            "description": "Courses, study notes, classrooms and user profiles over MongoDB",
            "endpoints": {
                "health": "/health",
                "users": "/users[/:uid]",
                "courses": "/courses[/:id]",
                "notes": "/notes[/:id]",
                "classrooms": "/classrooms[/:id]",
                "join": "/classrooms/join (POST)",
            }
        }
    }))
}

/// GET /health - Liveness only; the store is never queried
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "status": "ok",
                "timestamp": chrono::Utc::now(),
            }
        })),
    )
}

/// Any path or verb without a route
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::route_not_found(method, uri.path())
}
