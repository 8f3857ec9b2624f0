//! Core types for the image preview proxy

use bounded_lru::CacheStats;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for the proxy, loaded from the environment in `main`.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub cache_dir: PathBuf,
    pub cache_capacity: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cache_dir: PathBuf::from("./cache/previews"),
            cache_capacity: 10,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}
