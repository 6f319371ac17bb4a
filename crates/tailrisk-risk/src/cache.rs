//! Result cache shared by the engines.
//!
//! A cache belongs to exactly one source series. Looking up a value for a
//! different [`SeriesId`] drops every entry first; there is no partial
//! invalidation.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use tailrisk_core::types::SeriesId;

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
}

#[derive(Debug)]
struct CacheState<K, V> {
    source: Option<SeriesId>,
    entries: HashMap<K, V>,
    stats: CacheStats,
}

/// Memoizes engine results by key, scoped to one source series.
///
/// Caching never changes results; a cold cache and a warm cache return the
/// same values.
#[derive(Debug)]
pub struct ResultCache<K, V> {
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> Default for ResultCache<K, V> {
    fn default() -> Self {
        Self {
            state: Mutex::new(CacheState {
                source: None,
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
        }
    }
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, or computes and stores it.
    ///
    /// The lock is not held while `compute` runs. Errors are returned and not
    /// cached.
    pub fn get_or_try_insert_with<E, F>(&self, source: SeriesId, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        {
            let mut state = self.state.lock();
            if state.source != Some(source) {
                if !state.entries.is_empty() {
                    log::debug!("source series changed, dropping {} cached results", state.entries.len());
                }
                state.entries.clear();
                state.source = Some(source);
            }
            if let Some(value) = state.entries.get(&key) {
                let value = value.clone();
                state.stats.hits += 1;
                return Ok(value);
            }
            state.stats.misses += 1;
        }

        let value = compute()?;
        let mut state = self.state.lock();
        if state.source == Some(source) {
            state.entries.insert(key, value.clone());
        }
        Ok(value)
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.source = None;
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Hit/miss counters since construction.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }
}
