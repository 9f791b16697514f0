use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::data::loader;
use crate::data::model::Table;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Content key
// ---------------------------------------------------------------------------

/// Fingerprint of an upload: SHA-256 over the filename and the exact bytes.
pub fn content_key(bytes: &[u8], filename: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((filename.len() as u64).to_le_bytes());
    hasher.update(filename.as_bytes());
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

/// Caller-owned memo of [`loader::load`] results.
///
/// Entries are keyed by [`content_key`], so different content never hits a
/// stale table. Failed loads are not cached. With a capacity set, the oldest
/// entry is evicted first.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<String, Arc<Table>>,
    order: VecDeque<String>,
    capacity: Option<usize>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        LoadCache {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Return the cached table for this upload, loading it on a miss.
    pub fn get_or_load(&mut self, bytes: &[u8], filename: &str) -> Result<Arc<Table>> {
        let key = content_key(bytes, filename);
        if let Some(table) = self.entries.get(&key) {
            debug!("cache hit for {filename}");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(loader::load(bytes, filename)?);
        if let Some(cap) = self.capacity {
            while self.entries.len() >= cap {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                warn!("load cache full, evicting {oldest}");
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;

    #[test]
    fn key_depends_on_name_and_content() {
        let a = content_key(b"x,y\n1,2\n", "a.csv");
        assert_eq!(a, content_key(b"x,y\n1,2\n", "a.csv"));
        assert_ne!(a, content_key(b"x,y\n1,3\n", "a.csv"));
        assert_ne!(a, content_key(b"x,y\n1,2\n", "b.csv"));
        // length prefix keeps name/content boundaries distinct
        assert_ne!(content_key(b"v", "a.cs"), content_key(b"vv", "a.c"));
    }

    #[test]
    fn hit_returns_same_table() {
        let mut cache = LoadCache::new();
        let first = cache.get_or_load(b"Name\nAAA\n", "m.csv").unwrap();
        let second = cache.get_or_load(b"Name\nAAA\n", "m.csv").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_content_is_never_stale() {
        let mut cache = LoadCache::new();
        let first = cache.get_or_load(b"Name\nAAA\n", "m.csv").unwrap();
        let second = cache.get_or_load(b"Name\nBBB\n", "m.csv").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache = LoadCache::new();
        let err = cache.get_or_load(b"whatever", "data.txt").unwrap_err();
        assert!(matches!(err, TableError::UnsupportedFormat { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut cache = LoadCache::with_capacity(2);
        let a = cache.get_or_load(b"N\n1\n", "a.csv").unwrap();
        cache.get_or_load(b"N\n2\n", "b.csv").unwrap();
        cache.get_or_load(b"N\n3\n", "c.csv").unwrap();
        assert_eq!(cache.len(), 2);
        let reloaded = cache.get_or_load(b"N\n1\n", "a.csv").unwrap();
        assert!(!Arc::ptr_eq(&a, &reloaded));
        assert_eq!(a, reloaded);
    }
}
