#![cfg(feature = "array")]
//! Property-based tests for the sorted array collections and range views.
//!
//! These tests check the sorted collections against `BTreeSet`/`BTreeMap`
//! as a model, and the range-view laws: a window holds exactly the backing
//! elements in `[from, to)`, and nested windows intersect.

use livearray::array::{SortedArrayBackedMap, SortedArrayBackedSet};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

fn arbitrary_elements(max_size: usize) -> impl Strategy<Value = Vec<i16>> {
    prop::collection::vec(any::<i16>(), 0..max_size)
}

/// Two values in ascending order.
fn ordered_pair() -> impl Strategy<Value = (i16, i16)> {
    (any::<i16>(), any::<i16>()).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

// =============================================================================
// Ordering Laws
// =============================================================================

proptest! {
    /// Law: iteration yields the distinct elements in ascending order.
    #[test]
    fn prop_iteration_is_sorted_and_distinct(elements in arbitrary_elements(64)) {
        let set: SortedArrayBackedSet<i16> = elements.iter().copied().collect();
        let model: BTreeSet<i16> = elements.into_iter().collect();
        prop_assert_eq!(set.iter().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
    }

    /// Law: first and last agree with the model's extremes.
    #[test]
    fn prop_first_last_match_model(elements in arbitrary_elements(64)) {
        let set: SortedArrayBackedSet<i16> = elements.iter().copied().collect();
        let model: BTreeSet<i16> = elements.into_iter().collect();
        prop_assert_eq!(set.first().ok(), model.first().copied());
        prop_assert_eq!(set.last().ok(), model.last().copied());
    }

    /// Law: interleaved inserts and removes agree with the model.
    #[test]
    fn prop_mutation_sequence_matches_model(
        operations in prop::collection::vec((any::<bool>(), -32_i16..32), 0..128)
    ) {
        let mut set = SortedArrayBackedSet::new();
        let mut model = BTreeSet::new();
        for (is_insert, element) in operations {
            if is_insert {
                prop_assert_eq!(set.insert(element), model.insert(element));
            } else {
                prop_assert_eq!(set.remove(&element), model.remove(&element));
            }
        }
        prop_assert_eq!(set.len(), model.len());
        prop_assert_eq!(set.iter().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
    }

    /// Law: the sorted map agrees with `BTreeMap` after any insert sequence.
    #[test]
    fn prop_sorted_map_matches_model(
        entries in prop::collection::vec((any::<i16>(), any::<i32>()), 0..64)
    ) {
        let mut map = SortedArrayBackedMap::new();
        let mut model = BTreeMap::new();
        for (key, value) in entries {
            prop_assert_eq!(map.insert(key, value), model.insert(key, value));
        }
        prop_assert_eq!(map.iter().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
    }
}

// =============================================================================
// Range View Laws
// =============================================================================

proptest! {
    /// Law: sub_set(a, b).len() == |{ x in set : a <= x < b }|
    #[test]
    fn prop_sub_set_size(elements in arbitrary_elements(64), (from, to) in ordered_pair()) {
        let set: SortedArrayBackedSet<i16> = elements.iter().copied().collect();
        let model: BTreeSet<i16> = elements.into_iter().collect();
        let window = set.sub_set(from, to).unwrap();
        prop_assert_eq!(window.len(), model.range(from..to).count());
        prop_assert_eq!(
            window.iter().collect::<Vec<_>>(),
            model.range(from..to).copied().collect::<Vec<_>>()
        );
    }

    /// Law: a window stays consistent with the model after backing inserts.
    #[test]
    fn prop_sub_set_is_live(
        initial in arbitrary_elements(32),
        later in arbitrary_elements(32),
        (from, to) in ordered_pair()
    ) {
        let mut set: SortedArrayBackedSet<i16> = initial.iter().copied().collect();
        let mut model: BTreeSet<i16> = initial.into_iter().collect();
        let window = set.sub_set(from, to).unwrap();
        for element in later {
            set.insert(element);
            model.insert(element);
        }
        prop_assert_eq!(window.len(), model.range(from..to).count());
    }

    /// Law: sub_set(a, b).sub_set(c, d) holds [max(a, c), min(b, d)) when
    /// [c, d] lies inside [a, b].
    #[test]
    fn prop_nested_windows_intersect(
        elements in arbitrary_elements(64),
        (outer_from, outer_to) in ordered_pair(),
        offsets in (0.0_f64..=1.0, 0.0_f64..=1.0)
    ) {
        let set: SortedArrayBackedSet<i16> = elements.iter().copied().collect();
        let model: BTreeSet<i16> = elements.into_iter().collect();
        let span = f64::from(outer_to) - f64::from(outer_from);
        let pick = |offset: f64| {
            #[allow(clippy::cast_possible_truncation)]
            let picked = (f64::from(outer_from) + span * offset).floor() as i16;
            picked.clamp(outer_from, outer_to)
        };
        let (low, high) = (pick(offsets.0), pick(offsets.1));
        let (inner_from, inner_to) = if low <= high { (low, high) } else { (high, low) };

        let outer = set.sub_set(outer_from, outer_to).unwrap();
        let inner = outer.sub_set(inner_from, inner_to).unwrap();
        let expected: Vec<i16> = model
            .range(inner_from.max(outer_from)..inner_to.min(outer_to))
            .copied()
            .collect();
        prop_assert_eq!(inner.iter().collect::<Vec<_>>(), expected);
    }

    /// Law: insert through a window succeeds exactly for in-range elements.
    #[test]
    fn prop_window_insert_respects_bounds(
        (from, to) in ordered_pair(),
        element: i16
    ) {
        let set: SortedArrayBackedSet<i16> = SortedArrayBackedSet::new();
        let window = set.sub_set(from, to).unwrap();
        let in_range = from <= element && element < to;
        prop_assert_eq!(window.insert(element).is_ok(), in_range);
        prop_assert_eq!(set.contains(&element), in_range);
    }
}
