mod config;
mod errors;
mod llm_client;
mod optimization;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::transport::HttpTransport;
use crate::llm_client::LlmClient;
use crate::optimization::service::Optimizer;
use crate::optimization::validator::is_placeholder_key;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; provider credentials may still be missing
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RankKit API v{}", env!("CARGO_PKG_VERSION"));

    if is_placeholder_key(&config.llm.api_key) {
        warn!("LLM_API_KEY is not set; optimization requests will fail with API_KEY_MISSING");
    }

    // Initialize LLM client
    let transport =
        HttpTransport::new(config.llm.request_timeout).context("Failed to build HTTP client")?;
    let llm = LlmClient::new(Arc::new(transport), config.llm.clone());
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        config.llm.model,
        llm.endpoint()
    );

    let optimizer = Optimizer::new(llm, config.optimize.clone());
    info!(
        "Result cache: capacity {}, ttl {}s",
        config.optimize.cache_capacity,
        config.optimize.cache_ttl.as_secs()
    );

    // Build app state
    let state = AppState {
        optimizer: Arc::new(optimizer),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web front end's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
