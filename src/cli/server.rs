//! HTTP server implementing the snap-in contract
//!
//! `POST /handle/sync` takes one event envelope, dispatches on
//! `execution_metadata.function_name` and answers `{function_result}`
//! or `{error}`. `GET /health` reports liveness.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};
use crate::functions::{dispatch, FunctionContext};
use crate::types::AirdropEvent;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Context shared by all handlers
    pub context: FunctionContext,
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    config: ServerConfig,
}

/// Build the router (exposed for tests)
pub fn app(config: ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/handle/sync", post(handle_sync))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState { config }))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let app = app(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting snap-in server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Other(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Other(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Snap-in function invocation endpoint
async fn handle_sync(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AirdropEvent>,
) -> impl IntoResponse {
    let Some(function_name) = event.execution_metadata.function_name.clone() else {
        return (
            StatusCode::OK,
            Json(json!({
                "error": { "message": "Missing function_name in execution metadata" }
            })),
        )
            .into_response();
    };

    match dispatch(&function_name, &[event], &state.config.context).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({ "function_result": result })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::OK,
            Json(json!({ "error": { "message": e.to_string() } })),
        )
            .into_response(),
    }
}
