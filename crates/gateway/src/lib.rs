//! HTTP gateway for docchat.
//!
//! Routes:
//! - `POST /chat`   — streamed answer over the source documents (SSE)
//! - `GET  /health` — liveness
//! - everything else — the static client from `gateway.static_dir`
//!
//! Built on Axum. State is built once at startup and shared read-only.

pub mod chat;
pub mod error;
pub mod static_files;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use docchat_chat::ChatRelay;
use docchat_config::AppConfig;
use docchat_core::Provider;
use docchat_documents::ContextBuilder;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state for the gateway.
pub struct AppState {
    pub relay: ChatRelay,
    pub documents: ContextBuilder,
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        Self {
            relay: ChatRelay::from_config(provider, config),
            documents: ContextBuilder::new(config.documents.source_dir.clone()),
            static_dir: config.gateway.static_dir.clone(),
            max_body_bytes: config.gateway.max_body_bytes,
        }
    }
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - permissive CORS (the client may be served from another origin in development)
/// - request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let body_limit = state.max_body_bytes;
    let static_files = static_files::static_service(&state.static_dir);

    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat::chat_handler))
        .with_state(state)
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = docchat_providers::build_from_config(&config)?;
    info!(
        provider = provider.name(),
        model = %config.default_model,
        source_dir = %config.documents.source_dir.display(),
        "Provider ready"
    );

    let state = Arc::new(AppState::from_config(&config, provider));
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
