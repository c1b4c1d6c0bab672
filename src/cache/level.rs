//! A single fixed-capacity cache level.
//!
//! A level owns its key→value map and one [`EvictionPolicy`]. It never looks
//! at other levels; layering is handled by
//! [`MultilevelCache`](crate::cache::multilevel::MultilevelCache).

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::cache::policy::{EvictionPolicy, PolicyError, PolicyKind};
use crate::config::PromotionMode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("Cache level capacity must be at least 1")]
    ZeroCapacity,

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// A key/value pair pushed out of a level by its policy.
pub type Evicted = (String, String);

/// Per-level usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelStats {
    /// Number of entries currently stored.
    pub len: usize,
    /// Configured capacity.
    pub capacity: usize,
    /// Reads that found the key here.
    pub hits: u64,
    /// Reads that did not.
    pub misses: u64,
    /// Entries removed by the policy.
    pub evictions: u64,
    /// Values copied in from a slower level.
    pub promotions: u64,
}

impl LevelStats {
    /// Usage as a fraction of capacity. Above 1.0 only after bypass promotions.
    pub fn usage_fraction(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.len as f64 / self.capacity as f64
    }
}

#[derive(Debug)]
pub struct CacheLevel {
    capacity: usize,
    data: HashMap<String, String>,
    policy: EvictionPolicy,
    evict_on_overwrite: bool,
    stats: LevelStats,
}

impl CacheLevel {
    pub fn new(capacity: usize, kind: PolicyKind) -> Result<Self, LevelError> {
        if capacity == 0 {
            return Err(LevelError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            data: HashMap::with_capacity(capacity),
            policy: EvictionPolicy::new(kind),
            evict_on_overwrite: false,
            stats: LevelStats {
                capacity,
                ..Default::default()
            },
        })
    }

    /// Make `put` evict at capacity even when the key is already present.
    pub fn with_eviction_on_overwrite(mut self, enabled: bool) -> Self {
        self.evict_on_overwrite = enabled;
        self
    }

    /// Look up `key`, recording the access with the policy on a hit.
    pub fn get(&mut self, key: &str) -> Option<String> {
        match self.data.get(key) {
            Some(value) => {
                self.policy.access(key);
                self.stats.hits += 1;
                Some(value.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite `key`, evicting one victim first if the level is full.
    ///
    /// Returns the evicted entry, if any.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<Evicted>, LevelError> {
        let key = key.into();
        let present = self.data.contains_key(&key);

        let mut evicted = None;
        if self.data.len() >= self.capacity && (!present || self.evict_on_overwrite) {
            let victim = self.policy.evict()?;
            if let Some(old) = self.data.remove(&victim) {
                debug!(victim = %victim, capacity = self.capacity, "Evicted entry");
                self.stats.evictions += 1;
                evicted = Some((victim, old));
            }
        }

        self.policy.access(&key);
        self.data.insert(key, value.into());
        Ok(evicted)
    }

    /// Overwrite `key` directly: no capacity check, no policy access.
    pub fn update(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.data.insert(key.into(), value.into())
    }

    /// Receive a value found in a slower level.
    pub fn promote(
        &mut self,
        key: &str,
        value: &str,
        mode: PromotionMode,
    ) -> Result<Option<Evicted>, LevelError> {
        self.stats.promotions += 1;
        match mode {
            PromotionMode::Admit => self.put(key, value),
            PromotionMode::Bypass => {
                self.update(key, value);
                Ok(None)
            }
        }
    }

    /// Membership test; does not touch the policy.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Read-only view of the stored entries, in map order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the policy tracks exactly the keys that are stored.
    pub fn is_consistent(&self) -> bool {
        self.policy.len() == self.data.len() && self.data.keys().all(|k| self.policy.contains(k))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub fn policy(&self) -> &EvictionPolicy {
        &self.policy
    }

    pub fn stats(&self) -> LevelStats {
        LevelStats {
            len: self.data.len(),
            ..self.stats.clone()
        }
    }
}
