mod config;
mod embeddings;
mod errors;
mod matching;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::embeddings::{
    CachedEmbeddingProvider, EmbeddingProvider, HashingEmbedder, HttpEmbeddingClient,
};
use crate::matching::MatchEngine;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Matcher v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedding provider
    let provider = build_embedding_provider(&config)?;
    info!("Embedding provider initialized (model: {})", provider.model_id());
    info!(
        "Fusion weights: exact_skills={} semantic={}",
        config.fusion_weights.exact_skills, config.fusion_weights.semantic
    );

    let state = AppState {
        engine: Arc::new(MatchEngine::new(provider, config.fusion_weights)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the configured embedding backend, wrapped in a cache when enabled.
fn build_embedding_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match &config.embedding_backend {
        EmbeddingBackend::Http { api_url } => Arc::new(HttpEmbeddingClient::new(
            api_url,
            config.embedding_api_key.clone(),
            config.embedding_model.clone(),
            config.embedding_timeout,
            config.embedding_max_retries,
        )?),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.embedding_dimension)),
    };

    if config.embedding_cache_capacity == 0 {
        return Ok(provider);
    }
    info!(
        "Embedding cache enabled ({} entries)",
        config.embedding_cache_capacity
    );
    Ok(Arc::new(CachedEmbeddingProvider::new(
        provider,
        config.embedding_cache_capacity,
    )))
}
