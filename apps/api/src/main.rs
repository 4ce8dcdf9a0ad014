mod career;
mod config;
mod errors;
mod generation;
mod interview;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, ProviderKind};
use crate::generation::template::TemplateRegistry;
use crate::generation::Orchestrator;
use crate::interview::session::SessionStore;
use crate::llm_client::anthropic::AnthropicProvider;
use crate::llm_client::gemini::GeminiProvider;
use crate::llm_client::{CompletionClient, CompletionProvider};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
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

    info!("Starting MockMate API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion provider
    let provider: Arc<dyn CompletionProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(config.api_key.clone())),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config.api_key.clone())),
    };
    let client = CompletionClient::new(provider);
    info!(
        "Completion client initialized (provider: {}, model: {}, timeout: {}ms, retries: {})",
        client.provider_name(),
        config.model,
        config.timeout_ms,
        config.max_retries
    );

    // Initialize orchestrator with the built-in templates
    let orchestrator = Orchestrator::new(
        client,
        Arc::new(TemplateRegistry::builtin()),
        config.completion_options(),
    );

    // Build app state
    let state = AppState {
        orchestrator,
        sessions: SessionStore::new(config.session_ttl(), config.max_sessions),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the frontend origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
