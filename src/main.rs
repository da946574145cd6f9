use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use classnotes_api::config::AppConfig;
use classnotes_api::database::Collections;
use classnotes_api::state::AppState;

#[derive(Parser)]
#[command(name = "classnotes-api", version, about = "Courses, notes and classrooms REST API")]
struct Cli {
    #[arg(long, help = "Interface to bind (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up MONGODB_URI, MONGODB_DB, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    // Refuse to start without a connection string and database name
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    tracing::info!("Starting Classnotes API in {:?} mode", config.environment);

    // Collections stay unbound (503) until the store connection is up
    let state = AppState::new();
    let app = classnotes_api::app(state.clone(), &config.api);

    let bind_addr = config.api.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("🚀 Classnotes API listening on http://{}", bind_addr);
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    let collections = match Collections::connect(&config.database).await {
        Ok(collections) => collections,
        Err(e) => {
            server.abort();
            return Err(e).context("failed to connect to MongoDB");
        }
    };
    if state.bind(collections).is_err() {
        anyhow::bail!("collections were already bound");
    }
    tracing::info!("Collections bound; serving requests");

    server.await.context("server task panicked")??;
    Ok(())
}
