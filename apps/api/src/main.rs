mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod recruiting;
mod routes;
mod state;
mod storage;
mod transcription;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::store::PgSessionStore;
use crate::llm_client::transcription::OpenAiTranscriber;
use crate::llm_client::OpenAiChatClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3DocumentStorage;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hirewise API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // S3 / MinIO
    let storage = S3DocumentStorage::from_config(&config).await;
    info!("Document storage initialized (bucket: {})", config.s3_bucket);

    let llm_config = config.llm();
    let llm = OpenAiChatClient::new(&llm_config)?;
    info!("LLM client initialized (model: {})", llm.model());
    let transcriber = OpenAiTranscriber::new(&llm_config)?;

    let state = AppState {
        sessions: Arc::new(PgSessionStore::new(db.clone())),
        db,
        llm: Arc::new(llm),
        transcriber: Arc::new(transcriber),
        storage: Arc::new(storage),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to DASHBOARD_URL's host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
