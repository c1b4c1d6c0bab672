//! multilevel-cache: an in-memory, multilevel key-value cache.
//!
//! Values live in an ordered chain of levels, fastest first:
//!   L1 (small, hot) → L2 → ... → Ln (large, cold)
//!
//! Each level enforces its own capacity with an independent LRU or LFU
//! policy. Reads promote hits toward L1; writes always land in L1.

pub mod cache;
pub mod config;
pub mod metrics;

pub use cache::level::{CacheLevel, LevelStats};
pub use cache::multilevel::{new_shared_cache, CacheError, MultilevelCache, SharedCache};
pub use cache::policy::{EvictionPolicy, PolicyError, PolicyKind};
pub use cache::snapshot::LevelSnapshot;
pub use config::{CacheOptions, Config, PromotionMode};
