//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check size accounting and capacity bounds over arbitrary
//! operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{test_object, Admission, CacheConfig, CacheStore};

// == Test Configuration ==
const TEST_MAX_SIZE: u64 = 4096;

fn test_store(max_size: u64) -> CacheStore {
    CacheStore::new(CacheConfig {
        max_size,
        ttl: Duration::from_secs(300),
    })
}

// == Strategies ==
/// Keys drawn from a small space so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-d]{1,2}".prop_map(|s| format!("bucket/{}", s))
}

/// Sizes up to a little above capacity, so rejections happen too
fn size_strategy() -> impl Strategy<Value = usize> {
    0usize..(TEST_MAX_SIZE as usize + 512)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Insert { key: String, size: usize },
    Get { key: String },
    Invalidate { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), size_strategy()).prop_map(|(key, size)| CacheOp::Insert { key, size }),
        1 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of operations, total_size equals the sum of the sizes
    // of the entries present and never exceeds the capacity.
    #[test]
    fn prop_size_accounting(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let store = test_store(TEST_MAX_SIZE);

        for op in ops {
            match op {
                CacheOp::Insert { key, size } => {
                    store.insert(key, test_object(size));
                }
                CacheOp::Get { key } => {
                    store.get(&key);
                }
                CacheOp::Invalidate { key } => {
                    store.invalidate(&key);
                }
            }
            prop_assert!(store.total_size() <= TEST_MAX_SIZE);
            prop_assert_eq!(store.total_size(), store.content_size());
        }
    }

    // Inserting an object larger than the capacity leaves the store unchanged.
    #[test]
    fn prop_oversized_rejected(
        sizes in prop::collection::vec(1usize..512, 0..8),
        excess in 1usize..1024
    ) {
        let store = test_store(TEST_MAX_SIZE);
        for (i, size) in sizes.iter().enumerate() {
            store.insert(format!("bucket/{}", i), test_object(*size));
        }
        let before_size = store.total_size();
        let before_len = store.len();

        let outcome = store.insert("bucket/huge".to_string(), test_object(TEST_MAX_SIZE as usize + excess));

        prop_assert_eq!(outcome, Admission::Rejected);
        prop_assert!(store.get("bucket/huge").is_none());
        prop_assert_eq!(store.total_size(), before_size);
        prop_assert_eq!(store.len(), before_len);
    }

    // Inserting under pressure always makes room for the new entry, which is
    // then present.
    #[test]
    fn prop_eviction_makes_room(sizes in prop::collection::vec(1usize..=(TEST_MAX_SIZE as usize), 1..40)) {
        let store = test_store(TEST_MAX_SIZE);

        for (i, size) in sizes.into_iter().enumerate() {
            let key = format!("bucket/{}", i);
            let outcome = store.insert(key.clone(), test_object(size));
            prop_assert!(outcome.is_admitted());
            prop_assert!(store.get(&key).is_some());
            prop_assert!(store.total_size() <= TEST_MAX_SIZE);
            prop_assert_eq!(store.total_size(), store.content_size());
        }
    }

    // Invalidation decreases total_size by exactly the removed entry's size.
    #[test]
    fn prop_invalidate_exact_decrement(
        entries in prop::collection::hash_map(key_strategy(), 1usize..256, 1..10),
        target in key_strategy()
    ) {
        let store = test_store(TEST_MAX_SIZE);
        let entries: HashMap<String, usize> = entries;
        for (key, size) in &entries {
            store.insert(key.clone(), test_object(*size));
        }

        let before = store.total_size();
        match store.invalidate(&target) {
            Some(entry) => {
                prop_assert_eq!(Some(entry.size as usize), entries.get(&target).copied());
                prop_assert_eq!(store.total_size(), before - entry.size);
            }
            None => {
                prop_assert!(!entries.contains_key(&target));
                prop_assert_eq!(store.total_size(), before);
            }
        }
        prop_assert!(store.get(&target).is_none());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Concurrent writers over shared keys settle with consistent accounting.
    #[test]
    fn prop_concurrent_accounting(
        ops in prop::collection::vec(prop::collection::vec(cache_op_strategy(), 10..60), 2..6)
    ) {
        let store = Arc::new(test_store(TEST_MAX_SIZE));

        std::thread::scope(|scope| {
            for thread_ops in ops {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for op in thread_ops {
                        match op {
                            CacheOp::Insert { key, size } => {
                                store.insert(key, test_object(size));
                            }
                            CacheOp::Get { key } => {
                                store.get(&key);
                            }
                            CacheOp::Invalidate { key } => {
                                store.invalidate(&key);
                            }
                        }
                    }
                });
            }
        });

        prop_assert!(store.total_size() <= TEST_MAX_SIZE);
        prop_assert_eq!(store.total_size(), store.content_size());
    }
}
