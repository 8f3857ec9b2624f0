//! Bounded LRU cache with a pluggable eviction side effect
//!
//! Provides a capacity-bounded key/value store ordered by recency, built on
//! an arena-backed doubly-linked list. Every entry removed from the cache
//! (by capacity eviction or by `clear`) is handed to an optional per-cache
//! eviction handler before it is discarded, so callers can release external
//! resources the cache only refers to, such as files on disk.
//!
//! The cache is not internally synchronized; callers provide their own
//! mutual exclusion around it.

mod cache;
mod list;

pub use cache::{CacheStats, EvictHandler, LruCache};
pub use list::{Iter, NodeId, OrderedList};
