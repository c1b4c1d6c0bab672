//! Runtime configuration for multilevel-cache.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! The level layout and every cross-level behaviour switch live here.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::cache::multilevel::{CacheError, MultilevelCache};
use crate::cache::policy::PolicyKind;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "multilevel-cache", about = "Multilevel LRU/LFU cache demo")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "cache.json")]
    pub config: PathBuf,

    /// Print Prometheus metrics after the demo run.
    #[arg(long)]
    pub metrics: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Levels from fastest (first) to slowest (last).
    pub levels: Vec<LevelConfig>,

    /// Cross-level behaviour.
    pub options: CacheOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            levels: vec![
                LevelConfig {
                    capacity: 3,
                    policy: PolicyKind::Recency,
                },
                LevelConfig {
                    capacity: 2,
                    policy: PolicyKind::Frequency,
                },
            ],
            options: CacheOptions::default(),
        }
    }
}

/// One cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Maximum number of entries (must be at least 1).
    pub capacity: usize,

    /// Eviction policy ("LRU" or "LFU").
    pub policy: PolicyKind,
}

/// How a value found in a slower level is copied into the faster ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionMode {
    /// Insert through the receiving level's normal path: capacity is enforced
    /// and the policy sees the access.
    #[default]
    Admit,
    /// Raw overwrite: no capacity check, no policy update. The receiving level
    /// may grow past its capacity.
    Bypass,
}

/// Cross-level behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Promotion strategy on a read hit below level 0.
    pub promotion: PromotionMode,

    /// Evict even when a put overwrites a key that is already present.
    pub eviction_on_overwrite: bool,

    /// Demote evicted entries into the next slower level instead of dropping them.
    pub cascade_evictions: bool,
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults if it does not exist.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Build a cache with every configured level appended in order.
    pub fn build(&self) -> Result<MultilevelCache, CacheError> {
        let cache = MultilevelCache::new(self.options)?;
        for level in &self.levels {
            cache.add_level(level.capacity, level.policy)?;
        }
        Ok(cache)
    }

    /// Total entries the chain can hold if every level is full.
    pub fn total_capacity(&self) -> usize {
        self.levels.iter().map(|l| l.capacity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.levels.len(), 2);
        assert_eq!(cfg.levels[0].policy, PolicyKind::Recency);
        assert_eq!(cfg.options.promotion, PromotionMode::Admit);
        assert!(!cfg.options.cascade_evictions);
        assert_eq!(cfg.total_capacity(), 5);
    }

    #[test]
    fn test_parse_partial_json() {
        let cfg: Config = serde_json::from_str(
            r#"{ "levels": [{ "capacity": 4, "policy": "LFU" }], "options": { "promotion": "bypass" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.levels[0].capacity, 4);
        assert_eq!(cfg.levels[0].policy, PolicyKind::Frequency);
        assert_eq!(cfg.options.promotion, PromotionMode::Bypass);
        assert!(!cfg.options.eviction_on_overwrite);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let res: Result<Config, _> =
            serde_json::from_str(r#"{ "levels": [{ "capacity": 2, "policy": "BOGUS" }] }"#);
        assert!(res.is_err());
    }
}
