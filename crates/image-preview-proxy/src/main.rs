//! Image preview proxy
//!
//! Fetches remote JPEG images, caches them on disk behind a bounded LRU,
//! and serves resized previews over HTTP.

mod error;
mod fetch;
mod preview;
mod server;
mod store;
mod types;

use crate::error::{PreviewError, Result};
use crate::fetch::ImageFetcher;
use crate::server::{start_server, ServerState, SharedState};
use crate::store::ImageStore;
use crate::types::ProxyConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("image_preview_proxy=info".parse()?);

    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting image preview proxy...");

    // Load configuration from environment
    let config = load_config()?;
    info!("Listening on {}:{}", config.host, config.port);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Cache capacity: {} images", config.cache_capacity);

    std::fs::create_dir_all(&config.cache_dir)?;

    let store = ImageStore::new(
        ImageFetcher::new(),
        config.cache_dir.clone(),
        config.cache_capacity,
    );

    let state: SharedState = Arc::new(ServerState::new(store));

    // Serve until interrupted
    start_server(state.clone(), &config.host, config.port)
        .await
        .map_err(|e| PreviewError::Config(format!("Server error: {}", e)))?;

    // Cached previews do not survive a restart; drop them with the process.
    state.store.clear().await;
    let _ = std::fs::remove_dir_all(&config.cache_dir);

    Ok(())
}

fn load_config() -> Result<ProxyConfig> {
    let defaults = ProxyConfig::default();

    let host = std::env::var("HOST").unwrap_or(defaults.host);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let cache_dir = std::env::var("CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or(defaults.cache_dir);

    let cache_capacity = std::env::var("CACHE_CAPACITY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(defaults.cache_capacity);

    Ok(ProxyConfig {
        host,
        port,
        cache_dir,
        cache_capacity,
    })
}
