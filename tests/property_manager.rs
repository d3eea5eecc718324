//! Property-based tests for allocation manager correctness
//!
//! Uses proptest to check the manager against a brute-force model across many
//! random operation sequences

use binpack_rs::{AllocationManager, BinPackError, Policy};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Op {
    AddBin(u64),
    AddObject(u64, Policy),
    DeleteObject(usize),
    DeleteUnknown,
}

fn policy_strategy() -> impl Strategy<Value = Policy> {
    prop_oneof![
        Just(Policy::BestFit),
        Just(Policy::WorstFit),
        Just(Policy::CompositeA),
        Just(Policy::CompositeB),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (1u64..60).prop_map(Op::AddBin),
        5 => (1u64..40, policy_strategy()).prop_map(|(size, policy)| Op::AddObject(size, policy)),
        3 => any::<usize>().prop_map(Op::DeleteObject),
        1 => Just(Op::DeleteUnknown),
    ]
}

/// Bin a policy should pick given `(capacity, id)` pairs, by exhaustive scan
fn expected_bin(bins: &[(u64, u64)], size: u64, policy: Policy) -> Option<u64> {
    let fitting: Vec<(u64, u64)> = bins.iter().copied().filter(|&(c, _)| c >= size).collect();
    let min_cap = fitting.iter().map(|&(c, _)| c).min()?;
    let max_cap = fitting.iter().map(|&(c, _)| c).max()?;

    match policy {
        Policy::BestFit => ids_with(&fitting, min_cap).min(),
        Policy::WorstFit => ids_with(&fitting, max_cap).max(),
        Policy::CompositeA => ids_with(&fitting, max_cap).min(),
        Policy::CompositeB => ids_with(&fitting, min_cap).max(),
    }
}

fn ids_with(bins: &[(u64, u64)], capacity: u64) -> impl Iterator<Item = u64> + '_ {
    bins.iter()
        .filter(move |&&(c, _)| c == capacity)
        .map(|&(_, id)| id)
}

fn capacities(manager: &AllocationManager) -> Vec<(u64, u64)> {
    manager.bins().map(|bin| (bin.capacity(), bin.id())).collect()
}

proptest! {
    #[test]
    fn prop_operations_match_model(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let mut manager = AllocationManager::new();
        // bin id -> initial capacity
        let mut bins: BTreeMap<u64, u64> = BTreeMap::new();
        // object id -> (bin id, size)
        let mut objects: BTreeMap<u64, (u64, u64)> = BTreeMap::new();
        let mut next_bin = 0u64;
        let mut next_object = 0u64;

        for op in ops {
            match op {
                Op::AddBin(capacity) => {
                    manager.add_bin(next_bin, capacity).unwrap();
                    bins.insert(next_bin, capacity);
                    next_bin += 1;
                }
                Op::AddObject(size, policy) => {
                    let expected = expected_bin(&capacities(&manager), size, policy);
                    let result = manager.add_object(next_object, size, policy);
                    match expected {
                        Some(bin_id) => {
                            prop_assert_eq!(result.unwrap(), bin_id);
                            objects.insert(next_object, (bin_id, size));
                        }
                        None => {
                            let no_bin = matches!(result, Err(BinPackError::NoBinAvailable { .. }));
                            prop_assert!(no_bin);
                        }
                    }
                    next_object += 1;
                }
                Op::DeleteObject(pick) => {
                    if objects.is_empty() {
                        continue;
                    }
                    let id = *objects.keys().nth(pick % objects.len()).unwrap();
                    manager.delete_object(id).unwrap();
                    objects.remove(&id);
                }
                Op::DeleteUnknown => {
                    let result = manager.delete_object(u64::MAX);
                    prop_assert!(matches!(result, Err(BinPackError::ObjectNotFound(_))));
                }
            }

            prop_assert!(manager.verify().is_ok(), "{:?}", manager.verify());

            for (&bin_id, &initial) in &bins {
                let used: u64 = objects.values().filter(|(b, _)| *b == bin_id).map(|(_, s)| s).sum();
                let held: Vec<u64> = objects
                    .iter()
                    .filter(|(_, (b, _))| *b == bin_id)
                    .map(|(&id, _)| id)
                    .collect();
                let info = manager.bin_info(bin_id).unwrap();
                prop_assert_eq!(info.capacity, initial - used);
                prop_assert_eq!(info.objects, held);
            }
            for (&id, &(bin_id, _)) in &objects {
                prop_assert_eq!(manager.object_info(id).unwrap(), bin_id);
            }
        }
    }

    #[test]
    fn prop_add_then_delete_round_trips(
        bin_caps in prop::collection::vec(1u64..100, 1..20),
        preload in prop::collection::vec(1u64..20, 0..15),
        size in 1u64..100,
        policy in policy_strategy()
    ) {
        let mut manager = AllocationManager::new();
        for (id, &capacity) in bin_caps.iter().enumerate() {
            manager.add_bin(id as u64, capacity).unwrap();
        }
        for (id, &s) in preload.iter().enumerate() {
            // Preload may legitimately run out of room
            let _ = manager.add_object(id as u64, s, Policy::BestFit);
        }

        let before: Vec<_> = (0..bin_caps.len() as u64)
            .map(|id| manager.bin_info(id).unwrap())
            .collect();

        let extra = 10_000;
        if manager.add_object(extra, size, policy).is_ok() {
            manager.delete_object(extra).unwrap();
        }

        let after: Vec<_> = (0..bin_caps.len() as u64)
            .map(|id| manager.bin_info(id).unwrap())
            .collect();
        prop_assert_eq!(before, after);
        prop_assert!(manager.verify().is_ok());
    }

    #[test]
    fn prop_select_agrees_with_add(
        bin_caps in prop::collection::vec(1u64..50, 0..25),
        size in 1u64..60,
        policy in policy_strategy()
    ) {
        let mut manager = AllocationManager::new();
        for (id, &capacity) in bin_caps.iter().enumerate() {
            manager.add_bin(id as u64, capacity).unwrap();
        }

        let selected = manager.select_bin(size, policy).ok();
        let placed = manager.add_object(1, size, policy).ok();
        prop_assert_eq!(selected, placed);
    }
}
