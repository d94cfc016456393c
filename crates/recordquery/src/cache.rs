//! Result cache for the cacheable dispatch path.
//!
//! Entries are keyed by the descriptor's JSON encoding, which is canonical:
//! struct members serialize in declaration order and condition values use
//! sorted maps.

use crate::service::Record;
use recordquery_core::{Error, QueryDescriptor, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

/// Default number of cached result sets
const DEFAULT_CAPACITY: usize = 256;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve cacheable queries from the cache
    pub enabled: bool,
    /// Maximum number of result sets kept; oldest entries are evicted first
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Cache turned off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Set the capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went to the service
    pub misses: u64,
    /// Result sets currently held
    pub entries: usize,
}

struct CacheEntry {
    collection: String,
    rows: Vec<Record>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
    generation: u64,
    hits: u64,
    misses: u64,
}

/// Bounded FIFO cache of query results
pub struct QueryCache {
    capacity: usize,
    inner: RwLock<CacheInner>,
}

impl QueryCache {
    /// Create an empty cache holding at most `capacity` result sets
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    /// Cache key for a descriptor
    pub fn key(descriptor: &QueryDescriptor) -> Result<String> {
        descriptor.to_json()
    }

    /// Look up cached rows, counting the hit or miss
    pub fn get(&self, key: &str) -> Result<Option<Vec<Record>>> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;
        let rows = inner.entries.get(key).map(|entry| entry.rows.clone());
        match rows {
            Some(_) => inner.hits += 1,
            None => inner.misses += 1,
        }
        Ok(rows)
    }

    /// Invalidation counter, bumped by every invalidation and clear
    pub fn generation(&self) -> Result<u64> {
        let inner = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(inner.generation)
    }

    /// Store rows for `key`, evicting the oldest entries beyond capacity
    pub fn insert(&self, key: String, collection: &str, rows: Vec<Record>) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;
        self.store(&mut inner, key, collection, rows);
        Ok(())
    }

    /// Store rows computed while the cache was at `generation`.
    ///
    /// Skipped when an invalidation happened since, so rows read before it
    /// are never cached after it. Returns `false` when skipped.
    pub fn insert_at(
        &self,
        generation: u64,
        key: String,
        collection: &str,
        rows: Vec<Record>,
    ) -> Result<bool> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;
        if inner.generation != generation {
            return Ok(false);
        }
        self.store(&mut inner, key, collection, rows);
        Ok(true)
    }

    fn store(&self, inner: &mut CacheInner, key: String, collection: &str, rows: Vec<Record>) {
        if self.capacity == 0 {
            return;
        }

        let entry = CacheEntry {
            collection: collection.to_string(),
            rows,
        };

        if inner.entries.insert(key.clone(), entry).is_none() {
            inner.order.push_back(key);
            while inner.order.len() > self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.entries.remove(&oldest);
                }
            }
        }
    }

    /// Replace rows for `key` only if it is already cached.
    ///
    /// Returns whether an entry was refreshed.
    pub fn refresh(&self, key: &str, rows: Vec<Record>) -> Result<bool> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.rows = rows;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop every entry that queried `collection`, returning how many were removed
    pub fn invalidate_collection(&self, collection: &str) -> Result<usize> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;
        inner.generation += 1;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| entry.collection != collection);

        let CacheInner { entries, order, .. } = &mut *inner;
        order.retain(|key| entries.contains_key(key));
        Ok(before - entries.len())
    }

    /// Drop all entries; counters are kept
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;
        inner.generation += 1;
        inner.entries.clear();
        inner.order.clear();
        Ok(())
    }

    /// Current counters
    pub fn stats(&self) -> Result<CacheStats> {
        let inner = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(n: i64) -> Vec<Record> {
        let mut row = Record::new();
        row.insert("n".to_string(), json!(n));
        vec![row]
    }

    #[test]
    fn test_get_and_insert() {
        let cache = QueryCache::new(4);
        assert_eq!(cache.get("a").unwrap(), None);

        cache.insert("a".to_string(), "Account", rows(1)).unwrap();
        assert_eq!(cache.get("a").unwrap(), Some(rows(1)));

        let stats = cache.stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let cache = QueryCache::new(2);
        cache.insert("a".to_string(), "Account", rows(1)).unwrap();
        cache.insert("b".to_string(), "Account", rows(2)).unwrap();
        cache.insert("a".to_string(), "Account", rows(3)).unwrap();
        cache.insert("c".to_string(), "Account", rows(4)).unwrap();

        assert_eq!(cache.get("a").unwrap(), None);
        assert_eq!(cache.get("b").unwrap(), Some(rows(2)));
        assert_eq!(cache.get("c").unwrap(), Some(rows(4)));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = QueryCache::new(0);
        cache.insert("a".to_string(), "Account", rows(1)).unwrap();

        assert_eq!(cache.stats().unwrap().entries, 0);
    }

    #[test]
    fn test_refresh_only_existing() {
        let cache = QueryCache::new(4);
        assert!(!cache.refresh("a", rows(1)).unwrap());
        assert_eq!(cache.stats().unwrap().entries, 0);

        cache.insert("a".to_string(), "Account", rows(1)).unwrap();
        assert!(cache.refresh("a", rows(2)).unwrap());
        assert_eq!(cache.get("a").unwrap(), Some(rows(2)));
    }

    #[test]
    fn test_invalidate_collection() {
        let cache = QueryCache::new(4);
        cache.insert("a".to_string(), "Account", rows(1)).unwrap();
        cache.insert("b".to_string(), "Contact", rows(2)).unwrap();
        cache.insert("c".to_string(), "Account", rows(3)).unwrap();

        assert_eq!(cache.invalidate_collection("Account").unwrap(), 2);
        assert_eq!(cache.get("a").unwrap(), None);
        assert_eq!(cache.get("b").unwrap(), Some(rows(2)));

        cache.clear().unwrap();
        assert_eq!(cache.stats().unwrap().entries, 0);
    }

    #[test]
    fn test_insert_after_invalidation_is_skipped() {
        let cache = QueryCache::new(4);
        let generation = cache.generation().unwrap();

        cache.invalidate_collection("Account").unwrap();
        assert!(!cache
            .insert_at(generation, "a".to_string(), "Account", rows(1))
            .unwrap());
        assert_eq!(cache.stats().unwrap().entries, 0);

        let generation = cache.generation().unwrap();
        assert!(cache
            .insert_at(generation, "a".to_string(), "Account", rows(2))
            .unwrap());
        assert_eq!(cache.get("a").unwrap(), Some(rows(2)));
    }
}
