//! Integration tests for the eviction policies.

use std::collections::HashMap;

use proptest::prelude::*;

use multilevel_cache::cache::policy::{
    EvictionPolicy, LfuPolicy, LruPolicy, PolicyError, PolicyKind,
};

#[derive(Debug, Clone)]
enum Op {
    Access(u8),
    Evict,
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0u8..6).prop_map(Op::Access),
            1 => Just(Op::Evict),
        ],
        0..64,
    )
}

proptest! {
    #[test]
    fn lru_matches_access_order(ops in ops()) {
        let mut lru = LruPolicy::new();
        let mut model: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Access(k) => {
                    let key = format!("k{k}");
                    model.retain(|m| m != &key);
                    model.push(key.clone());
                    lru.access(&key);
                }
                Op::Evict => {
                    let expected = if model.is_empty() { None } else { Some(model.remove(0)) };
                    prop_assert_eq!(lru.evict(), expected);
                }
            }
            prop_assert_eq!(lru.len(), model.len());
        }
    }

    #[test]
    fn lfu_evicts_min_count_then_oldest(ops in ops()) {
        let mut lfu = LfuPolicy::new();
        let mut model: HashMap<String, (u64, u64)> = HashMap::new();
        let mut clock = 0u64;

        for op in ops {
            match op {
                Op::Access(k) => {
                    let key = format!("k{k}");
                    let entry = model.entry(key.clone()).or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 = clock;
                    clock += 1;
                    lfu.access(&key);
                }
                Op::Evict => {
                    let expected = model
                        .iter()
                        .min_by_key(|(_, v)| **v)
                        .map(|(k, _)| k.clone());
                    if let Some(k) = &expected {
                        model.remove(k);
                    }
                    prop_assert_eq!(lfu.evict(), expected);
                }
            }
            prop_assert_eq!(lfu.len(), model.len());
        }
    }
}

#[test]
fn test_lru_reaccess_moves_to_back() {
    let mut policy = EvictionPolicy::new(PolicyKind::Recency);
    policy.access("A");
    policy.access("B");
    policy.access("C");
    policy.access("A");

    assert_eq!(policy.evict().unwrap(), "B");
    assert_eq!(policy.evict().unwrap(), "C");
    assert_eq!(policy.evict().unwrap(), "A");
}

#[test]
fn test_lfu_sequence_advances_on_every_access() {
    let mut policy = EvictionPolicy::new(PolicyKind::Frequency);
    policy.access("A"); // A=1
    policy.access("B"); // B=1
    policy.access("B"); // B=2
    policy.access("A"); // A=2, touched after B

    // Counts tie at 2; B's latest touch is older.
    assert_eq!(policy.evict().unwrap(), "B");
    assert_eq!(policy.evict().unwrap(), "A");
}

#[test]
fn test_evict_on_empty_policy_fails() {
    for kind in [PolicyKind::Recency, PolicyKind::Frequency] {
        let mut policy = EvictionPolicy::new(kind);
        assert!(policy.is_empty());
        assert_eq!(policy.evict(), Err(PolicyError::Empty(kind)));
    }
}

#[test]
fn test_policy_kind_display() {
    assert_eq!(PolicyKind::Recency.to_string(), "LRU");
    assert_eq!(PolicyKind::Frequency.to_string(), "LFU");
    assert_eq!(EvictionPolicy::new(PolicyKind::Frequency).kind(), PolicyKind::Frequency);
}
