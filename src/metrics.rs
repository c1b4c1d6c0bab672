//! Prometheus counters for cache traffic.
//!
//! Each cache owns a private [`Registry`] so several caches in one process do
//! not collide. Level labels follow the current chain position ("L1", "L2",
//! ...), so removing a level relabels every slower level from then on while
//! earlier counts stay under the old label.
//!
//! Series are created only by the `record_*` calls; reading a counter never
//! adds one to the exposition.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct CacheMetrics {
    registry: Registry,
    hits: IntCounterVec,
    misses: IntCounter,
    evictions: IntCounterVec,
    promotions: IntCounterVec,
}

/// Label for the level at 0-based `index`.
pub fn level_label(index: usize) -> String {
    format!("L{}", index + 1)
}

impl CacheMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let hits = IntCounterVec::new(
            Opts::new("cache_hits_total", "Reads served by a cache level"),
            &["level"],
        )?;
        let misses = IntCounter::new("cache_misses_total", "Reads that missed every level")?;
        let evictions = IntCounterVec::new(
            Opts::new("cache_evictions_total", "Entries evicted from a cache level"),
            &["level"],
        )?;
        let promotions = IntCounterVec::new(
            Opts::new(
                "cache_promotions_total",
                "Values copied into a level from a slower one",
            ),
            &["level"],
        )?;

        registry.register(Box::new(hits.clone()))?;
        registry.register(Box::new(misses.clone()))?;
        registry.register(Box::new(evictions.clone()))?;
        registry.register(Box::new(promotions.clone()))?;

        Ok(Self {
            registry,
            hits,
            misses,
            evictions,
            promotions,
        })
    }

    pub fn record_hit(&self, index: usize) {
        self.hits.with_label_values(&[level_label(index).as_str()]).inc();
    }

    pub fn record_miss(&self) {
        self.misses.inc();
    }

    pub fn record_eviction(&self, index: usize) {
        self.evictions
            .with_label_values(&[level_label(index).as_str()])
            .inc();
    }

    pub fn record_promotion(&self, index: usize) {
        self.promotions
            .with_label_values(&[level_label(index).as_str()])
            .inc();
    }

    pub fn hits(&self, label: &str) -> u64 {
        self.level_counter("cache_hits_total", label)
    }

    pub fn misses(&self) -> u64 {
        self.misses.get()
    }

    pub fn evictions(&self, label: &str) -> u64 {
        self.level_counter("cache_evictions_total", label)
    }

    pub fn promotions(&self, label: &str) -> u64 {
        self.level_counter("cache_promotions_total", label)
    }

    /// Value of a per-level counter, 0 if it was never recorded.
    fn level_counter(&self, name: &str, label: &str) -> u64 {
        let families = self.registry.gather();
        let Ok(text) = TextEncoder::new().encode_to_string(&families) else {
            return 0;
        };
        let prefix = format!("{name}{{level=\"{label}\"}} ");
        text.lines()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Render all counters in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

impl std::fmt::Debug for CacheMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheMetrics")
            .field("misses", &self.misses.get())
            .finish_non_exhaustive()
    }
}
