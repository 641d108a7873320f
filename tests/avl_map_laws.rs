//! Property-based tests for `AvlTreeMap`.
//!
//! These tests verify the map's laws and structural invariants using
//! proptest: binary-search-tree order, the AVL balance bound, and
//! behavioral equivalence with `std::collections::BTreeMap`.

use std::collections::BTreeMap;

use avlmap::AvlTreeMap;
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

/// An operation applied to both the map under test and the model.
#[derive(Clone, Debug)]
enum Op {
    Insert(i32, i32),
    Remove(i32),
}

/// Strategy for operation sequences over a deliberately small key domain,
/// so that overwrites and removals of present keys actually happen.
fn arbitrary_ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (any::<i8>(), any::<i32>()).prop_map(|(key, value)| Op::Insert(i32::from(key), value)),
            any::<i8>().prop_map(|key| Op::Remove(i32::from(key))),
        ],
        0..max_len,
    )
}

// =============================================================================
// Get-Insert Laws
// =============================================================================

proptest! {
    /// Law: get after insert returns the inserted value.
    #[test]
    fn prop_get_insert_law(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..20),
        key: i32,
        value: i32
    ) {
        let mut map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        map.insert(key, value);
        prop_assert_eq!(map.get(&key), Some(&value));
    }

    /// Law: insert does not affect other keys.
    #[test]
    fn prop_get_insert_other_law(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..20),
        key1: i32,
        key2: i32,
        value: i32
    ) {
        prop_assume!(key1 != key2);
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let mut updated = map.clone();
        updated.insert(key1, value);
        prop_assert_eq!(updated.get(&key2), map.get(&key2));
    }
}

// =============================================================================
// Remove Laws
// =============================================================================

proptest! {
    /// Law: get after remove returns None.
    #[test]
    fn prop_get_remove_law(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..20),
        key: i32
    ) {
        let mut map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        map.remove(&key);
        prop_assert_eq!(map.get(&key), None);
    }

    /// Law: remove does not affect other keys.
    #[test]
    fn prop_get_remove_other_law(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..20),
        key1: i32,
        key2: i32
    ) {
        prop_assume!(key1 != key2);
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let mut shrunk = map.clone();
        shrunk.remove(&key1);
        prop_assert_eq!(shrunk.get(&key2), map.get(&key2));
    }

    /// Law: removing an absent key changes nothing.
    #[test]
    fn prop_remove_absent_is_no_op(
        entries in prop::collection::vec((any::<i8>(), any::<i32>()), 0..20),
        key: i32
    ) {
        let map: AvlTreeMap<i32, i32> = entries
            .into_iter()
            .map(|(key, value)| (i32::from(key), value))
            .collect();
        prop_assume!(!map.contains_key(&key));
        let mut touched = map.clone();
        prop_assert_eq!(touched.remove(&key), None);
        prop_assert_eq!(&touched, &map);
        prop_assert_eq!(touched.height(), map.height());
    }
}

// =============================================================================
// Length Laws
// =============================================================================

proptest! {
    /// Law: insert of a new key grows the length by 1, overwrite keeps it.
    #[test]
    fn prop_insert_length_law(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..20),
        key: i32,
        value: i32
    ) {
        let mut map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let length_before = map.len();
        let previous = map.insert(key, value);
        let expected = if previous.is_some() { length_before } else { length_before + 1 };
        prop_assert_eq!(map.len(), expected);
    }

    /// Law: removing a present key shrinks the length by exactly 1.
    #[test]
    fn prop_remove_length_law(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 1..20),
    ) {
        let mut map: AvlTreeMap<i32, i32> = entries.clone().into_iter().collect();
        let length_before = map.len();
        let (key, _) = entries[0];
        prop_assert!(map.remove(&key).is_some());
        prop_assert_eq!(map.len(), length_before - 1);
    }
}

// =============================================================================
// Structural Invariant Laws
// =============================================================================

proptest! {
    /// Every tree built by a sequence of inserts satisfies BST order, the
    /// AVL balance bound, and link consistency, and iterates in strictly
    /// ascending key order.
    #[test]
    fn prop_inserts_preserve_invariants(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..64),
    ) {
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        map.check_invariants();

        let keys: Vec<i32> = map.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Invariants hold after every single operation of a random
    /// insert/remove interleaving, not just at the end.
    #[test]
    fn prop_every_step_preserves_invariants(ops in arbitrary_ops(64)) {
        let mut map: AvlTreeMap<i32, i32> = AvlTreeMap::new();
        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    map.insert(key, value);
                }
                Op::Remove(key) => {
                    map.remove(&key);
                }
            }
            map.check_invariants();
        }
    }

    /// The AVL height bound: height <= 1.44 * log2(N + 2).
    #[test]
    fn prop_height_is_logarithmic(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 1..256),
    ) {
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        #[allow(clippy::cast_precision_loss)]
        let bound = 1.44 * ((map.len() + 2) as f64).log2();
        #[allow(clippy::cast_precision_loss)]
        let height = map.height() as f64;
        prop_assert!(height <= bound, "height {height} exceeds AVL bound {bound}");
    }
}

// =============================================================================
// Model-Based Equivalence
// =============================================================================

proptest! {
    /// The map behaves exactly like `BTreeMap` under arbitrary operation
    /// interleavings: same return values, same entries, same order.
    #[test]
    fn prop_matches_btreemap_model(ops in arbitrary_ops(128)) {
        let mut map: AvlTreeMap<i32, i32> = AvlTreeMap::new();
        let mut model: BTreeMap<i32, i32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(map.insert(key, value), model.insert(key, value));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(map.remove(&key), model.remove(&key));
                }
            }
        }

        prop_assert_eq!(map.len(), model.len());
        let mine: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        let theirs: Vec<(i32, i32)> = model.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(mine, theirs);
        map.check_invariants();
    }

    /// min/max agree with the model's first/last entries.
    #[test]
    fn prop_min_max_match_model(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..32),
    ) {
        let map: AvlTreeMap<i32, i32> = entries.clone().into_iter().collect();
        let model: BTreeMap<i32, i32> = entries.into_iter().collect();
        prop_assert_eq!(map.min(), model.first_key_value());
        prop_assert_eq!(map.max(), model.last_key_value());
    }
}
