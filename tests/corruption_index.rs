//! Index corruption detection tests
//!
//! Hammers `OrderedIndex` with random inserts and deletes and checks that the
//! AVL balance, cached heights and key order survive every step

use binpack_rs::{CapacityKey, OrderedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

#[test]
fn test_random_churn_matches_btreemap() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut index = OrderedIndex::new();
    let mut reference = BTreeMap::new();

    for step in 0..5_000 {
        let key: u32 = rng.gen_range(0..500);
        if rng.gen_bool(0.6) {
            let value: u32 = rng.gen();
            let inserted = index.insert(key, value);
            let expected = !reference.contains_key(&key);
            if expected {
                reference.insert(key, value);
            }
            assert_eq!(inserted, expected, "insert {} at step {}", key, step);
        } else {
            assert_eq!(index.delete(&key), reference.remove(&key), "delete {} at step {}", key, step);
        }

        if step % 50 == 0 {
            assert!(index.is_balanced(), "unbalanced at step {}", step);
            assert!(index.is_sorted(), "out of order at step {}", step);
        }
    }

    assert_eq!(index.len(), reference.len());
    let ours: Vec<(u32, u32)> = index.iter().map(|(k, v)| (*k, *v)).collect();
    let theirs: Vec<(u32, u32)> = reference.into_iter().collect();
    assert_eq!(ours, theirs);
}

#[test]
fn test_drain_to_empty() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut index = OrderedIndex::new();
    let mut keys: Vec<u64> = (0..1_000).collect();

    for &key in &keys {
        index.insert(key, ());
    }

    // Remove in a shuffled order
    for i in (1..keys.len()).rev() {
        let j = rng.gen_range(0..=i);
        keys.swap(i, j);
    }
    for (removed, key) in keys.iter().enumerate() {
        assert!(index.delete(key).is_some());
        assert_eq!(index.len(), keys.len() - removed - 1);
        assert!(index.is_balanced());
    }

    assert!(index.is_empty());
    assert!(index.root().is_none());
}

#[test]
fn test_capacity_rekeying_churn() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut index: OrderedIndex<CapacityKey, ()> = OrderedIndex::new();
    let mut capacities: Vec<u64> = (0..200).map(|_| rng.gen_range(0..1_000)).collect();

    for (id, &capacity) in capacities.iter().enumerate() {
        index.insert(CapacityKey::new(capacity, id as u64), ());
    }

    // Simulate placements: delete under the old key, reinsert under the new one
    for _ in 0..10_000 {
        let id = rng.gen_range(0..capacities.len());
        let old = CapacityKey::new(capacities[id], id as u64);
        let new_capacity = rng.gen_range(0..1_000);

        assert!(index.delete(&old).is_some());
        capacities[id] = new_capacity;
        assert!(index.insert(CapacityKey::new(new_capacity, id as u64), ()));
    }

    assert_eq!(index.len(), capacities.len());
    assert!(index.is_balanced());
    assert!(index.is_sorted());

    let mut expected: Vec<CapacityKey> = capacities
        .iter()
        .enumerate()
        .map(|(id, &capacity)| CapacityKey::new(capacity, id as u64))
        .collect();
    expected.sort();
    assert_eq!(index.keys().copied().collect::<Vec<_>>(), expected);
}

#[test]
fn test_height_bound_under_adversarial_order() {
    let mut index = OrderedIndex::new();
    // Zig-zag inserts exercise both double-rotation cases
    for i in 0..2_048u64 {
        let key = if i % 2 == 0 { i } else { 4_096 - i };
        index.insert(key, ());
    }
    assert!(index.is_balanced());
    // 1.44 * log2(2048 + 2) is just under 16
    assert!(index.height() <= 16, "height {}", index.height());
}
