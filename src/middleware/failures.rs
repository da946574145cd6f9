use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Private cause of a 500, attached to the response by `ApiError`
#[derive(Debug, Clone)]
pub struct FailureDetail(pub String);

/// Log server-side failures with the route that produced them.
///
/// Client errors pass through silently; they are expected outcomes.
pub async fn log_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        let detail = response
            .extensions()
            .get::<FailureDetail>()
            .map(|d| d.0.as_str())
            .unwrap_or("unknown failure");
        tracing::error!(%method, %path, error = detail, "{} {} failed", method, path);
    } else if status.is_server_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), "{} {} unavailable", method, path);
    }

    response
}
