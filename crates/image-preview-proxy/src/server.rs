//! HTTP server for the preview proxy
//!
//! Provides /health and /fill/{width}/{height}/{*source} endpoints.

use crate::error::PreviewError;
use crate::preview::{self, MIN_DIMENSION};
use crate::store::ImageStore;
use crate::types::HealthResponse;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub store: ImageStore,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(store: ImageStore) -> Self {
        Self {
            store,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/fill/{width}/{height}/{*source}", get(fill))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server, running until interrupted.
pub async fn start_server(state: SharedState, host: &str, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = format!("{}:{}", host, port);
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.store.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

/// Fetch a source image and respond with a resized JPEG preview.
///
/// The client's request headers travel with the upstream fetch, so
/// sources expecting auth or user-agent values still answer.
async fn fill(
    State(state): State<SharedState>,
    Path((width, height, source)): Path<(u32, u32, String)>,
    headers: HeaderMap,
) -> Response {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return error_response(&PreviewError::SizeTooSmall { width, height });
    }

    let (bytes, from_cache) = match state.store.fetch(&source, &headers).await {
        Ok(result) => result,
        Err(err) => {
            warn!(source = %source, error = %err, "Failed to fetch image");
            return error_response(&err);
        }
    };

    match preview::render_preview(&bytes, width, height) {
        Ok(jpeg) => {
            let cache_header = if from_cache { "HIT" } else { "MISS" };

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "image/jpeg")
                .header(header::CACHE_CONTROL, "public, max-age=86400")
                .header("X-Cache", cache_header)
                .body(Body::from(jpeg))
                .unwrap()
        }
        Err(err) => {
            warn!(source = %source, error = %err, "Failed to render preview");
            error_response(&err)
        }
    }
}

fn error_response(err: &PreviewError) -> Response {
    let status = match err {
        PreviewError::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
        // The source's own verdict is passed through.
        PreviewError::RemoteRejected(code) => {
            StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        PreviewError::UnsupportedContentType(_) | PreviewError::SizeTooSmall { .. } => {
            StatusCode::BAD_REQUEST
        }
        PreviewError::Storage(_) | PreviewError::InvalidImage(_) | PreviewError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
