//! Eviction policies: decide which key a cache level gives up when it is full.
//!
//! Two strategies are provided:
//! - [`LruPolicy`]: evicts the least recently touched key
//! - [`LfuPolicy`]: evicts the least frequently touched key, oldest first on ties
//!
//! [`EvictionPolicy`] is the tagged union a [`CacheLevel`](crate::cache::level::CacheLevel)
//! owns. Policies only track keys; values live in the level's map.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Unknown eviction policy {0:?} (expected LRU or LFU)")]
    UnknownKind(String),

    #[error("Eviction requested from an empty {0} policy")]
    Empty(PolicyKind),
}

/// The fixed set of eviction strategies a level can be built with.
///
/// Serialized as "LRU" / "LFU"; deserialized through [`FromStr`], so config
/// files accept the same names as [`str::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PolicyKind {
    /// Least recently used.
    #[serde(rename = "LRU")]
    Recency,
    /// Least frequently used.
    #[serde(rename = "LFU")]
    Frequency,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Recency => write!(f, "LRU"),
            PolicyKind::Frequency => write!(f, "LFU"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" | "recency" => Ok(PolicyKind::Recency),
            "lfu" | "frequency" => Ok(PolicyKind::Frequency),
            _ => Err(PolicyError::UnknownKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for PolicyKind {
    type Error = PolicyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Recency tracking.
///
/// Every access stamps the key with a fresh tick; `order` maps ticks back to
/// keys so the oldest stamp is always the first entry.
#[derive(Debug, Default)]
pub struct LruPolicy {
    order: BTreeMap<u64, String>,
    stamps: HashMap<String, u64>,
    tick: u64,
}

impl LruPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `key` to the most recently used position, tracking it if new.
    pub fn access(&mut self, key: &str) {
        let stamp = self.tick;
        self.tick += 1;

        if let Some(old) = self.stamps.insert(key.to_string(), stamp) {
            self.order.remove(&old);
        }
        self.order.insert(stamp, key.to_string());
    }

    /// Remove and return the least recently used key.
    pub fn evict(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stamps.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Tracked keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }
}

/// Frequency tracking with recency tie-break.
///
/// Each key carries `(count, seq)`. `seq` comes from a per-policy counter that
/// advances on every access, so `(count, seq)` pairs are unique and the
/// smallest one in `queue` is always the next victim.
#[derive(Debug, Default)]
pub struct LfuPolicy {
    queue: BTreeMap<(u64, u64), String>,
    entries: HashMap<String, (u64, u64)>,
    counter: u64,
}

impl LfuPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the access count of `key` and mark it as the latest touch.
    pub fn access(&mut self, key: &str) {
        let seq = self.counter;
        self.counter += 1;

        let count = match self.entries.get(key) {
            Some(&(count, old_seq)) => {
                self.queue.remove(&(count, old_seq));
                count + 1
            }
            None => 1,
        };

        self.entries.insert(key.to_string(), (count, seq));
        self.queue.insert((count, seq), key.to_string());
    }

    /// Remove and return the key with the lowest count, oldest touch first.
    pub fn evict(&mut self) -> Option<String> {
        let (_, key) = self.queue.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }

    /// Access count recorded for `key`, if tracked.
    pub fn frequency(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|&(count, _)| count)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The eviction strategy owned by a single cache level.
#[derive(Debug)]
pub enum EvictionPolicy {
    Recency(LruPolicy),
    Frequency(LfuPolicy),
}

impl EvictionPolicy {
    pub fn new(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Recency => EvictionPolicy::Recency(LruPolicy::new()),
            PolicyKind::Frequency => EvictionPolicy::Frequency(LfuPolicy::new()),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            EvictionPolicy::Recency(_) => PolicyKind::Recency,
            EvictionPolicy::Frequency(_) => PolicyKind::Frequency,
        }
    }

    /// Record that `key` was just inserted or read.
    pub fn access(&mut self, key: &str) {
        match self {
            EvictionPolicy::Recency(p) => p.access(key),
            EvictionPolicy::Frequency(p) => p.access(key),
        }
    }

    /// Remove and return the next victim.
    ///
    /// Calling this with nothing tracked is a bookkeeping bug in the caller
    /// and is reported as [`PolicyError::Empty`].
    pub fn evict(&mut self) -> Result<String, PolicyError> {
        let victim = match self {
            EvictionPolicy::Recency(p) => p.evict(),
            EvictionPolicy::Frequency(p) => p.evict(),
        };
        victim.ok_or(PolicyError::Empty(self.kind()))
    }

    pub fn contains(&self, key: &str) -> bool {
        match self {
            EvictionPolicy::Recency(p) => p.contains(key),
            EvictionPolicy::Frequency(p) => p.contains(key),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EvictionPolicy::Recency(p) => p.len(),
            EvictionPolicy::Frequency(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_evicts_oldest() {
        let mut lru = LruPolicy::new();
        lru.access("a");
        lru.access("b");
        lru.access("c");
        lru.access("a"); // a moves to MRU

        assert_eq!(lru.keys().collect::<Vec<_>>(), vec!["b", "c", "a"]);
        assert_eq!(lru.evict().as_deref(), Some("b"));
        assert_eq!(lru.evict().as_deref(), Some("c"));
        assert_eq!(lru.evict().as_deref(), Some("a"));
        assert_eq!(lru.evict(), None);
    }

    #[test]
    fn test_lfu_counts_and_ties() {
        let mut lfu = LfuPolicy::new();
        lfu.access("a");
        lfu.access("b");
        lfu.access("a");
        lfu.access("c");

        assert_eq!(lfu.frequency("a"), Some(2));
        assert_eq!(lfu.frequency("b"), Some(1));

        // b and c tie at 1; b was touched first.
        assert_eq!(lfu.evict().as_deref(), Some("b"));
        assert_eq!(lfu.evict().as_deref(), Some("c"));
        assert_eq!(lfu.evict().as_deref(), Some("a"));
        assert!(lfu.is_empty());
    }

    #[test]
    fn test_empty_evict_is_an_error() {
        let mut policy = EvictionPolicy::new(PolicyKind::Frequency);
        assert_eq!(
            policy.evict(),
            Err(PolicyError::Empty(PolicyKind::Frequency))
        );
    }

    #[test]
    fn test_policy_kind_serde_matches_parse() {
        for name in ["LRU", "lru", "Recency", "RECENCY"] {
            let kind: PolicyKind = serde_json::from_str(&format!("{name:?}")).unwrap();
            assert_eq!(kind, PolicyKind::Recency);
        }
        for name in ["LFU", "Lfu", "Frequency"] {
            let kind: PolicyKind = serde_json::from_str(&format!("{name:?}")).unwrap();
            assert_eq!(kind, PolicyKind::Frequency);
        }
        assert!(serde_json::from_str::<PolicyKind>("\"BOGUS\"").is_err());

        assert_eq!(serde_json::to_string(&PolicyKind::Recency).unwrap(), "\"LRU\"");
        assert_eq!(serde_json::to_string(&PolicyKind::Frequency).unwrap(), "\"LFU\"");
    }

    #[test]
    fn test_policy_kind_parsing() {
        assert_eq!("LRU".parse::<PolicyKind>(), Ok(PolicyKind::Recency));
        assert_eq!("lfu".parse::<PolicyKind>(), Ok(PolicyKind::Frequency));
        assert_eq!("Recency".parse::<PolicyKind>(), Ok(PolicyKind::Recency));
        assert_eq!(
            "BOGUS".parse::<PolicyKind>(),
            Err(PolicyError::UnknownKind("BOGUS".to_string()))
        );
    }
}
