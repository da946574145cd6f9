#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use classnotes_api::config::ApiConfig;
use classnotes_api::database::Collections;
use classnotes_api::state::AppState;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(state: AppState) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port,
            enable_request_logging: false,
            ..ApiConfig::default()
        };
        let app = classnotes_api::app(state, &config);
        let listener = tokio::net::TcpListener::bind(config.bind_addr())
            .await
            .context("failed to bind test port")?;

        let handle = tokio::spawn(async move {
            let _ = axum_serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            handle,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        read(res).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(&body).send().await?;
        read(res).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.put(self.url(path)).json(&body).send().await?;
        read(res).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.delete(self.url(path)).send().await?;
        read(res).await
    }

    /// Number of documents a list endpoint returns
    pub async fn count(&self, path: &str) -> Result<usize> {
        let (status, body) = self.get(path).await?;
        assert_eq!(status, StatusCode::OK, "list {} failed: {}", path, body);
        Ok(body["data"].as_array().map(Vec::len).unwrap_or_default())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}

async fn axum_serve(listener: tokio::net::TcpListener, app: axum::Router) -> std::io::Result<()> {
    axum::serve(listener, app).await
}

/// Server backed by fresh in-memory collections
pub async fn spawn_server() -> Result<TestServer> {
    let collections = Collections::in_memory().await?;
    TestServer::spawn(AppState::with_collections(collections)).await
}

/// Server whose collections were never bound
pub async fn spawn_unbound_server() -> Result<(TestServer, AppState)> {
    let state = AppState::new();
    let server = TestServer::spawn(state.clone()).await?;
    Ok((server, state))
}
