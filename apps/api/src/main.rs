mod analytics;
mod config;
mod documents;
mod embedding;
mod errors;
mod extraction;
mod jobs;
mod keywords;
mod matching;
mod models;
mod parsing;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::client::HttpEmbedder;
use crate::embedding::pool::EmbeddingPool;
use crate::parsing::vocabulary::Vocabulary;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MatchStore, MemoryMatchStore, PgMatchStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentRank API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn MatchStore> = match &config.database_url {
        Some(url) => Arc::new(
            PgMatchStore::connect(url)
                .await
                .context("Failed to initialize PostgreSQL store")?,
        ),
        None => {
            warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(MemoryMatchStore::new())
        }
    };

    let vocabulary = match &config.vocabulary_path {
        Some(path) => Vocabulary::load(path)
            .with_context(|| format!("Failed to load vocabulary from {}", path.display()))?,
        None => Vocabulary::default(),
    };
    info!(
        "Vocabulary {} loaded ({} skills)",
        vocabulary.version,
        vocabulary.skills.len()
    );

    let embedder = HttpEmbedder::new(
        config.embedding_api_url.clone(),
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
        config.embedding_dimension,
        config.embedding_timeout,
    )?;
    if !embedder.is_configured() {
        warn!("EMBEDDING_API_KEY not set; semantic matching is unavailable");
    }
    info!(
        "Embedding provider initialized (model: {}, dimension: {}, degraded mode: {})",
        config.embedding_model, config.embedding_dimension, config.embedding_degraded_mode
    );

    let embeddings = EmbeddingPool::new(
        Arc::new(embedder),
        config.embedding_max_concurrency,
        config.embedding_timeout,
        config.embedding_degraded_mode,
    );

    let state = AppState {
        config: config.clone(),
        store,
        embeddings,
        vocabulary: Arc::new(vocabulary),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
