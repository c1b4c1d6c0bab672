//! Multilevel cache management.
//!
//! This module contains the core cache data structures and algorithms:
//! - [`policy`]: LRU and LFU eviction policies
//! - [`level`]: Fixed-capacity level bound to one policy
//! - [`multilevel`]: The level chain that orchestrates lookup, promotion and eviction
//! - [`snapshot`]: Read-only level views for display

pub mod level;
pub mod multilevel;
pub mod policy;
pub mod snapshot;
