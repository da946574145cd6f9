pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::handlers::system::route_not_found;
use crate::state::AppState;

/// Build the full HTTP router
pub fn app(state: AppState, api: &ApiConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", with_fallback(get(handlers::system::root)))
        .route("/health", with_fallback(get(handlers::system::health)))
        // Resources
        .merge(user_routes())
        .merge(course_routes())
        .merge(note_routes())
        .merge(classroom_routes())
        .fallback(route_not_found)
        .with_state(state)
        // Global middleware
        .layer(axum::middleware::from_fn(middleware::log_failures))
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .layer(CorsLayer::permissive());

    if api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Unsupported verbs on a known path answer like unknown paths
fn with_fallback(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(route_not_found)
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users", with_fallback(get(users::list).post(users::upsert)))
        .route(
            "/users/:uid",
            with_fallback(get(users::get).put(users::update).delete(users::delete)),
        )
}

fn course_routes() -> Router<AppState> {
    use handlers::courses;

    Router::new()
        .route("/courses", with_fallback(get(courses::list).post(courses::create)))
        .route(
            "/courses/:id",
            with_fallback(get(courses::get).put(courses::update).delete(courses::delete)),
        )
}

fn note_routes() -> Router<AppState> {
    use handlers::notes;

    Router::new()
        .route("/notes", with_fallback(get(notes::list).post(notes::create)))
        .route(
            "/notes/:id",
            with_fallback(get(notes::get).put(notes::update).delete(notes::delete)),
        )
}

fn classroom_routes() -> Router<AppState> {
    use handlers::classrooms;

    Router::new()
        .route(
            "/classrooms",
            with_fallback(get(classrooms::list).post(classrooms::create)),
        )
        // Static segment wins over /classrooms/:id
        .route("/classrooms/join", with_fallback(post(classrooms::join)))
        .route(
            "/classrooms/:id",
            with_fallback(get(classrooms::get).put(classrooms::update).delete(classrooms::delete)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Collections, DatabaseError, DocumentCollection, SortOrder, UpdateOutcome};
    use crate::middleware::FailureDetail;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use mongodb::bson::{oid::ObjectId, Document};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Store whose every call fails the way a dropped connection would
    struct BrokenCollection;

    impl BrokenCollection {
        fn failure() -> DatabaseError {
            DatabaseError::UnexpectedResponse("connection reset by peer".into())
        }
    }

    #[async_trait]
    impl DocumentCollection for BrokenCollection {
        fn name(&self) -> &str {
            "broken"
        }

        async fn insert_one(&self, _: Document) -> Result<ObjectId, DatabaseError> {
            Err(Self::failure())
        }

        async fn find_one(&self, _: Document) -> Result<Option<Document>, DatabaseError> {
            Err(Self::failure())
        }

        async fn find(&self, _: Document, _: Option<SortOrder>) -> Result<Vec<Document>, DatabaseError> {
            Err(Self::failure())
        }

        async fn update_one(&self, _: Document, _: Document, _: bool) -> Result<UpdateOutcome, DatabaseError> {
            Err(Self::failure())
        }

        async fn delete_one(&self, _: Document) -> Result<u64, DatabaseError> {
            Err(Self::failure())
        }

        async fn ensure_unique(&self, _: &str) -> Result<(), DatabaseError> {
            Err(Self::failure())
        }
    }

    fn broken_app() -> Router {
        let broken: Arc<dyn DocumentCollection> = Arc::new(BrokenCollection);
        let collections = Collections {
            users: broken.clone(),
            courses: broken.clone(),
            notes: broken.clone(),
            classrooms: broken,
        };
        app(AppState::with_collections(collections), &ApiConfig::default())
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn ready_app() -> Router {
        let collections = Collections::in_memory().await.unwrap();
        app(AppState::with_collections(collections), &ApiConfig::default())
    }

    #[tokio::test]
    async fn unknown_route_echoes_path_and_method() {
        let (status, body) = send(ready_app().await, "GET", "/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], json!("/unknown"));
        assert_eq!(body["method"], json!("GET"));
    }

    #[tokio::test]
    async fn wrong_verb_on_known_path_is_not_found() {
        let (status, body) = send(ready_app().await, "PATCH", "/courses", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["method"], json!("PATCH"));
        assert_eq!(body["path"], json!("/courses"));
    }

    #[tokio::test]
    async fn unbound_state_answers_503_but_health_is_ok() {
        let router = app(AppState::new(), &ApiConfig::default());

        let (status, body) = send(router.clone(), "GET", "/courses", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], json!(false));

        let (status, body) = send(router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], json!("ok"));
    }

    #[tokio::test]
    async fn validation_runs_before_the_store_is_needed() {
        let router = app(AppState::new(), &ApiConfig::default());
        let (status, body) = send(router, "POST", "/courses", Some(json!({ "title": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let router = ready_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/notes")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn join_is_not_shadowed_by_id_route() {
        let router = ready_app().await;
        let (status, body) = send(router, "POST", "/classrooms/join", Some(json!({ "classCode": "ZZZZZZ" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Classroom not found"));
    }

    #[tokio::test]
    async fn undecodable_path_segment_is_a_json_bad_request() {
        let (status, body) = send(ready_app().await, "GET", "/users/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("BAD_REQUEST"));
        assert!(body["error"].is_string());

        let (status, body) = send(ready_app().await, "DELETE", "/courses/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() {
        let config = ApiConfig {
            max_request_size_bytes: 64,
            ..ApiConfig::default()
        };
        let collections = Collections::in_memory().await.unwrap();
        let router = app(AppState::with_collections(collections), &config);

        let payload = json!({ "title": "x".repeat(512), "faculty": "Science" });
        let (status, body) = send(router, "POST", "/courses", Some(payload)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("PAYLOAD_TOO_LARGE"));
    }

    #[tokio::test]
    async fn store_failure_is_a_500_without_detail() {
        let request = Request::builder().uri("/courses").body(Body::empty()).unwrap();
        let response = broken_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The failure logger sees the cause; the client does not
        let detail = response.extensions().get::<FailureDetail>().map(|d| d.0.clone());
        assert!(detail.unwrap().contains("connection reset by peer"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Internal server error"));
        assert_eq!(body["code"], json!("INTERNAL_SERVER_ERROR"));
        assert!(!body.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn store_failure_on_lookup_by_uid_is_a_500() {
        let (status, body) = send(broken_app(), "GET", "/users/abc", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Internal server error"));
    }
}
