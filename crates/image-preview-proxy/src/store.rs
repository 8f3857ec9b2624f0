//! Fetch-through image store
//!
//! Front of the LRU cache: serves cached image bytes from disk, and on a
//! miss fetches from the source, persists the bytes next to the cache and
//! publishes the file path as the cache value. Evicted entries have their
//! backing file deleted by the cache's eviction handler.

use crate::error::{PreviewError, Result};
use crate::fetch::ImageFetcher;
use bounded_lru::{CacheStats, LruCache};
use reqwest::header::HeaderMap;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Caching front for upstream images.
///
/// Two locks with distinct scopes: the cache lock covers the index/order
/// pair and is never held across I/O; the publish lock serializes the
/// persist-and-publish tail of the miss path, so concurrent misses for the
/// same key settle on a single backing file. Cache-hit reads never wait on
/// the publish lock.
pub struct ImageStore {
    fetcher: ImageFetcher,
    cache: Mutex<LruCache<String, PathBuf>>,
    publish_lock: Mutex<()>,
    cache_dir: PathBuf,
}

impl ImageStore {
    pub fn new(fetcher: ImageFetcher, cache_dir: PathBuf, capacity: usize) -> Self {
        let cache = LruCache::with_evict_handler(capacity, |path: PathBuf| {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Deleted evicted image file"),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Failed to delete evicted image file")
                }
            }
        });
        Self {
            fetcher,
            cache: Mutex::new(cache),
            publish_lock: Mutex::new(()),
            cache_dir,
        }
    }

    /// Returns the bytes for `source` and whether they came from the
    /// cache. The client's `headers` are forwarded with the upstream
    /// request on a miss.
    ///
    /// Readers of an evicted entry do not block eviction; a reader whose
    /// file is deleted between lookup and read simply re-enters the miss
    /// path.
    pub async fn fetch(&self, source: &str, headers: &HeaderMap) -> Result<(Vec<u8>, bool)> {
        if let Some(path) = self.cached_path(source).await {
            match tokio::fs::read(&path).await {
                Ok(bytes) => return Ok((bytes, true)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    debug!(source, "Cached file vanished before read, refetching");
                }
                Err(err) => return Err(PreviewError::Storage(Box::new(err))),
            }
        }

        // Concurrent misses for the same key fetch independently; the race
        // is settled at publish time, not by queueing behind the first
        // fetcher.
        let bytes = self.fetcher.fetch(source, headers).await?;
        self.publish(source, bytes).await
    }

    /// Publish tail of the miss path, serialized by the publish lock.
    ///
    /// A racing fetch may have published `source` while ours was in
    /// flight. Serve its file and drop our copy, so at most one backing
    /// file per key accumulates; only an entry whose file has already been
    /// evicted again (NotFound) is replaced. Any other read failure is
    /// surfaced without touching the published entry.
    async fn publish(&self, source: &str, bytes: Vec<u8>) -> Result<(Vec<u8>, bool)> {
        let _publish = self.publish_lock.lock().await;

        if let Some(path) = self.cached_path(source).await {
            match tokio::fs::read(&path).await {
                Ok(existing) => return Ok((existing, true)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    debug!(source, "Winning entry already evicted, publishing ours");
                }
                Err(err) => return Err(PreviewError::Storage(Box::new(err))),
            }
        }

        let path = self.persist(&bytes)?;
        self.cache.lock().await.set(source.to_string(), path);
        Ok((bytes, false))
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    /// Drops every cached entry; the eviction handler deletes each backing
    /// file.
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    async fn cached_path(&self, source: &str) -> Option<PathBuf> {
        self.cache.lock().await.get(source).cloned()
    }

    /// Writes `bytes` to a fresh file in the cache directory. The file is
    /// removed on drop unless `keep` succeeds, so a failed write never
    /// leaves a partial file behind or reaches the cache.
    fn persist(&self, bytes: &[u8]) -> Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix("image_")
            .tempfile_in(&self.cache_dir)?;
        file.write_all(bytes)?;
        let (_file, path) = file
            .keep()
            .map_err(|err| PreviewError::Storage(Box::new(err.error)))?;
        Ok(path)
    }
}
