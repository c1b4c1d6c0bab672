//! Point-in-time views of cache levels for display.

use std::fmt;

use crate::cache::level::CacheLevel;
use crate::cache::policy::PolicyKind;
use crate::metrics::level_label;

/// A copy of one level's contents, taken under the cache lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSnapshot {
    /// "L1", "L2", ...
    pub label: String,
    pub policy: PolicyKind,
    pub capacity: usize,
    /// Entries sorted by key.
    pub entries: Vec<(String, String)>,
}

impl LevelSnapshot {
    pub(crate) fn capture(index: usize, level: &CacheLevel) -> Self {
        let mut entries: Vec<(String, String)> = level
            .entries()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        entries.sort();

        Self {
            label: level_label(index),
            policy: level.policy_kind(),
            capacity: level.capacity(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for LevelSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Cache [{} {}/{}]:",
            self.label,
            self.policy,
            self.entries.len(),
            self.capacity
        )?;
        for (key, value) in &self.entries {
            write!(f, " {key}: {value}")?;
        }
        Ok(())
    }
}
