mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use classnotes_api::database::Collections;

#[tokio::test]
async fn health_is_ok() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));

    Ok(())
}

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], json!(env!("CARGO_PKG_VERSION")));
    assert!(body["data"]["endpoints"]["notes"].is_string(), "missing endpoints: {}", body);

    Ok(())
}

#[tokio::test]
async fn unmatched_route_echoes_path_and_method() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get("/unknown").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["path"], json!("/unknown"));
    assert_eq!(body["method"], json!("GET"));

    let (status, body) = server.delete("/courses").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["method"], json!("DELETE"));

    Ok(())
}

#[tokio::test]
async fn store_endpoints_answer_503_until_bound() -> Result<()> {
    let (server, state) = common::spawn_unbound_server().await?;

    for path in ["/users", "/courses", "/notes", "/classrooms"] {
        let (status, body) = server.get(path).await?;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{} should be unavailable", path);
        assert_eq!(body["code"], json!("SERVICE_UNAVAILABLE"));
    }

    // Health never touches the store
    let (status, _) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);

    assert!(state.bind(Collections::in_memory().await?).is_ok());
    let (status, body) = server.get("/courses").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    Ok(())
}
