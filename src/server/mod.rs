// HTTP surface
// POST /chat runs the assistant pipeline, GET /health reports store status


use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::assistant::Assistant;
use crate::config::ServerConfig;
use crate::database::PartStore;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub message: String,
}

#[derive(Clone)]
pub struct AppState {
    pub assistant: Assistant,
    pub store: Arc<dyn PartStore>,
}

/// Build the application router with CORS and request tracing
#[inline]
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(server))
}

/// Cross-origin policy for the configured browser front end
#[inline]
pub fn build_cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unusable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    info!("CORS: allowing origins {:?}", server.allowed_origins);

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<ChatResponse> {
    info!("Chat query received ({} chars)", request.query.len());
    let message = state.assistant.answer(&request.query).await;
    Json(ChatResponse { message })
}

async fn health(State(state): State<AppState>) -> Response {
    match state.store.count().await {
        Ok(records) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "records": records })),
        )
            .into_response(),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Bind `server.bind_address()` and serve until Ctrl-C
#[inline]
pub async fn serve(server: &ServerConfig, state: AppState) -> Result<()> {
    let address = server.bind_address();
    let app = router(state, server);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;

    info!("HTTP server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await
        .context("HTTP server terminated unexpectedly")
}
