//! The multilevel cache: an ordered chain of [`CacheLevel`]s.
//!
//! The cache is the only thing callers talk to. It:
//! - Reads from the fastest level first and promotes hits into faster levels
//! - Writes to level 0 only
//! - Discards evicted entries, or demotes them one level down when cascading is on
//!
//! Every public operation runs under one lock over the whole chain, so callers
//! observe a single total order of operations.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::level::{CacheLevel, Evicted, LevelError, LevelStats};
use crate::cache::policy::{PolicyError, PolicyKind};
use crate::cache::snapshot::LevelSnapshot;
use crate::config::CacheOptions;
use crate::metrics::CacheMetrics;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache has no levels to write to")]
    NoLevels,

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub struct MultilevelCache {
    /// Index 0 is the fastest level.
    levels: Mutex<Vec<CacheLevel>>,
    options: CacheOptions,
    metrics: CacheMetrics,
}

impl MultilevelCache {
    /// Create an empty cache with no levels.
    pub fn new(options: CacheOptions) -> Result<Self, CacheError> {
        Ok(Self {
            levels: Mutex::new(Vec::new()),
            options,
            metrics: CacheMetrics::new()?,
        })
    }

    /// Append a level at the slow end of the chain.
    pub fn add_level(&self, capacity: usize, kind: PolicyKind) -> Result<(), CacheError> {
        let level = CacheLevel::new(capacity, kind)?
            .with_eviction_on_overwrite(self.options.eviction_on_overwrite);

        let mut levels = self.levels.lock();
        levels.push(level);
        info!(level = levels.len(), capacity, policy = %kind, "Added cache level");
        Ok(())
    }

    /// Append a level, parsing the policy name ("LRU", "LFU", ...).
    pub fn add_level_named(&self, capacity: usize, policy: &str) -> Result<(), CacheError> {
        let kind: PolicyKind = policy.parse()?;
        self.add_level(capacity, kind)
    }

    /// Remove the level at 1-based `index`. Out-of-range indices are ignored.
    ///
    /// Slower levels shift up one position, and so do their metric labels:
    /// after removing L1, the old L2 reports as "L1". Counters already
    /// recorded under a label are not moved.
    ///
    /// Returns whether a level was removed.
    pub fn remove_level(&self, index: usize) -> bool {
        let mut levels = self.levels.lock();
        if index == 0 || index > levels.len() {
            warn!(index, levels = levels.len(), "Ignoring out-of-range level removal");
            return false;
        }
        let removed = levels.remove(index - 1);
        info!(
            level = index,
            entries = removed.len(),
            remaining = levels.len(),
            "Removed cache level"
        );
        true
    }

    /// Look up `key` from the fastest level down.
    ///
    /// A hit at level `i` copies the value into levels 0 through `i-1`
    /// according to [`CacheOptions::promotion`]. Levels are filled fastest
    /// first, so a victim cascading down from level `t` lands before level
    /// `t+1` receives the key and cannot push it back out.
    pub fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut levels = self.levels.lock();

        let found = levels
            .iter_mut()
            .enumerate()
            .find_map(|(i, level)| level.get(key).map(|value| (i, value)));

        let Some((hit, value)) = found else {
            self.metrics.record_miss();
            debug!(key, "Cache miss");
            return Ok(None);
        };

        self.metrics.record_hit(hit);
        debug!(key, level = hit + 1, "Cache hit");

        for target in 0..hit {
            let evicted = levels[target].promote(key, &value, self.options.promotion)?;
            self.metrics.record_promotion(target);
            debug!(key, from = hit + 1, to = target + 1, "Promoted entry");
            self.settle(&mut levels, target, evicted)?;
        }

        Ok(Some(value))
    }

    /// Insert `key` into level 0.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> Result<(), CacheError> {
        let mut levels = self.levels.lock();
        let first = levels.first_mut().ok_or(CacheError::NoLevels)?;
        let evicted = first.put(key, value)?;
        self.settle(&mut levels, 0, evicted)
    }

    /// Dispose of an entry evicted from level `index`: drop it, or with
    /// cascading on, push it down until some level absorbs it.
    fn settle(
        &self,
        levels: &mut [CacheLevel],
        mut index: usize,
        mut evicted: Option<Evicted>,
    ) -> Result<(), CacheError> {
        while let Some((key, value)) = evicted.take() {
            self.metrics.record_eviction(index);

            let next = index + 1;
            if !self.options.cascade_evictions || next >= levels.len() {
                debug!(key = %key, level = index + 1, "Discarded evicted entry");
                break;
            }

            debug!(key = %key, from = index + 1, to = next + 1, "Demoted evicted entry");
            evicted = levels[next].put(key, value)?;
            index = next;
        }
        Ok(())
    }

    /// Whether any level holds `key`. Does not affect eviction order.
    pub fn contains(&self, key: &str) -> bool {
        self.levels.lock().iter().any(|level| level.contains(key))
    }

    pub fn level_count(&self) -> usize {
        self.levels.lock().len()
    }

    /// Whether the chain has no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.lock().is_empty()
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Statistics for each level, fastest first.
    pub fn stats(&self) -> Vec<LevelStats> {
        self.levels.lock().iter().map(CacheLevel::stats).collect()
    }

    /// Contents of each level, fastest first.
    pub fn snapshot(&self) -> Vec<LevelSnapshot> {
        self.levels
            .lock()
            .iter()
            .enumerate()
            .map(|(i, level)| LevelSnapshot::capture(i, level))
            .collect()
    }

    /// Run `f` against the level at 0-based `index` while holding the lock.
    pub fn with_level<R>(&self, index: usize, f: impl FnOnce(&CacheLevel) -> R) -> Option<R> {
        self.levels.lock().get(index).map(f)
    }
}

impl std::fmt::Debug for MultilevelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultilevelCache")
            .field("levels", &self.level_count())
            .field("options", &self.options)
            .finish()
    }
}

/// Thread-safe handle to a cache.
pub type SharedCache = Arc<MultilevelCache>;

/// Wrap a cache for sharing across threads.
pub fn new_shared_cache(cache: MultilevelCache) -> SharedCache {
    Arc::new(cache)
}
