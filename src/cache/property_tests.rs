//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the entity cache against a plain map reference model.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::EntityCache;

// == Strategies ==
/// Small id space so operation sequences actually collide on keys.
fn id_strategy() -> impl Strategy<Value = u64> {
    0u64..32
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,16}"
}

/// Generates a sequence of entity cache operations for testing
#[derive(Debug, Clone)]
enum EntityOp {
    Insert { id: u64, value: String },
    Get { id: u64 },
    Invalidate { id: u64 },
    Clear,
}

fn entity_op_strategy() -> impl Strategy<Value = EntityOp> {
    prop_oneof![
        4 => (id_strategy(), value_strategy())
            .prop_map(|(id, value)| EntityOp::Insert { id, value }),
        4 => id_strategy().prop_map(|id| EntityOp::Get { id }),
        2 => id_strategy().prop_map(|id| EntityOp::Invalidate { id }),
        1 => Just(EntityOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, the cache agrees with a plain HashMap
    // model, and the statistics count exactly the hits, misses, and
    // invalidations that occurred.
    #[test]
    fn prop_entity_cache_matches_model(ops in prop::collection::vec(entity_op_strategy(), 1..60)) {
        let cache = EntityCache::new();
        let mut model: HashMap<u64, String> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut expected_invalidations: u64 = 0;

        for op in ops {
            match op {
                EntityOp::Insert { id, value } => {
                    cache.insert(id, value.clone());
                    model.insert(id, value);
                }
                EntityOp::Get { id } => {
                    let got = cache.get(id);
                    match model.get(&id) {
                        Some(expected) => {
                            expected_hits += 1;
                            prop_assert_eq!(got.as_ref(), Some(expected));
                        }
                        None => {
                            expected_misses += 1;
                            prop_assert_eq!(got, None);
                        }
                    }
                }
                EntityOp::Invalidate { id } => {
                    let removed = cache.invalidate(id);
                    if removed {
                        expected_invalidations += 1;
                    }
                    prop_assert_eq!(removed, model.remove(&id).is_some());
                }
                EntityOp::Clear => {
                    cache.clear();
                    model.clear();
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.invalidations, expected_invalidations, "Invalidations mismatch");
        prop_assert_eq!(stats.total_entries, model.len(), "Total entries mismatch");
    }

    // Inserting a snapshot and reading it back returns exactly that snapshot.
    #[test]
    fn prop_insert_then_get(id in id_strategy(), value in value_strategy()) {
        let cache = EntityCache::new();

        cache.insert(id, value.clone());

        prop_assert_eq!(cache.get(id), Some(value));
    }

    // Invalidation removes only the targeted id.
    #[test]
    fn prop_invalidate_removes_only_target(id in id_strategy(), value in value_strategy()) {
        let cache = EntityCache::new();
        let other_id = id.wrapping_add(1);

        cache.insert(id, value.clone());
        cache.insert(other_id, value.clone());

        cache.invalidate(id);

        prop_assert_eq!(cache.get(id), None);
        prop_assert_eq!(cache.get(other_id), Some(value));
    }
}
