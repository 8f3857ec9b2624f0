//! Capacity-bounded LRU cache over the recency list

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::list::{NodeId, OrderedList};

/// Side effect invoked with the value of every entry removed from the
/// cache, whether by capacity eviction or by [`LruCache::clear`], before
/// the entry is discarded. Replacing an existing key's value is not a
/// removal and does not invoke the handler.
pub type EvictHandler<V> = Box<dyn FnMut(V) + Send>;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Bounded key/value store with least-recently-used eviction.
///
/// A `HashMap` index and an [`OrderedList`] are kept in lockstep: a key is
/// in the index iff its entry is in the list, most recently touched at the
/// front. After every public operation at most `capacity` entries are
/// live.
///
/// Methods are not individually reentrant-safe; callers wrap the cache in
/// their own lock when sharing it.
pub struct LruCache<K, V> {
    capacity: usize,
    index: HashMap<K, NodeId>,
    order: OrderedList<Entry<K, V>>,
    on_evict: Option<EvictHandler<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("entries", &self.index.len())
            .field("has_evict_handler", &self.on_evict.is_some())
            .finish()
    }
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "cache capacity must be at least 1");
        Self {
            capacity,
            index: HashMap::with_capacity(capacity),
            order: OrderedList::with_capacity(capacity),
            on_evict: None,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Creates a cache with an eviction handler installed from the start.
    pub fn with_evict_handler(
        capacity: usize,
        handler: impl FnMut(V) + Send + 'static,
    ) -> Self {
        let mut cache = Self::new(capacity);
        cache.set_evict_handler(handler);
        cache
    }

    /// Installs the eviction handler, replacing any previous one. The
    /// handler is per-instance; independent caches never share one.
    pub fn set_evict_handler(&mut self, handler: impl FnMut(V) + Send + 'static) {
        self.on_evict = Some(Box::new(handler));
    }

    /// Removes the eviction handler; removals become silent again.
    pub fn clear_evict_handler(&mut self) {
        self.on_evict = None;
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.index.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    /// Inserts or updates `key`, returning whether it already existed.
    ///
    /// An existing key has its value replaced in place and is moved to the
    /// front; the entry count is unchanged so no eviction check runs. A new
    /// key is pushed to the front, and if that exceeds the capacity the
    /// coldest entry is detached from both index and list and handed to
    /// the eviction handler.
    pub fn set(&mut self, key: K, value: V) -> bool {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(id) {
                entry.value = value;
            }
            self.order.move_to_front(id);
            return true;
        }

        let id = self.order.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        if self.order.len() > self.capacity {
            self.evict_coldest();
        }
        false
    }

    /// Looks up `key`, refreshing its recency on a hit. A miss is a normal
    /// result with no side effect.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key).copied() {
            Some(id) => {
                self.order.move_to_front(id);
                self.hits += 1;
                self.order.get(id).map(|entry| &entry.value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Removes every entry, invoking the eviction handler once per entry.
    pub fn clear(&mut self) {
        while let Some(back) = self.order.back() {
            if let Some(entry) = self.order.remove(back) {
                self.index.remove(&entry.key);
                if let Some(handler) = self.on_evict.as_mut() {
                    handler(entry.value);
                }
            }
        }
        debug_assert!(self.index.is_empty());
    }

    fn evict_coldest(&mut self) {
        let Some(back) = self.order.back() else {
            return;
        };
        if let Some(entry) = self.order.remove(back) {
            self.index.remove(&entry.key);
            self.evictions += 1;
            debug!(entries = self.index.len(), "evicted least recently used entry");
            if let Some(handler) = self.on_evict.as_mut() {
                handler(entry.value);
            }
        }
    }
}
