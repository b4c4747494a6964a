//! Array-backed ordered collections with live views.
//!
//! This module provides maps and sets stored in parallel growable arrays,
//! located through a pluggable [`IndexStrategy`]:
//!
//! - [`ArrayBackedMap`] / [`ArrayBackedSet`]: linear scan, insertion order
//! - [`SortedArrayBackedMap`] / [`SortedArrayBackedSet`]: binary search under
//!   a [`Comparator`], with `first`/`last` and range views
//!
//! # Live Views
//!
//! Views never copy. Key sets, value and entry views, per-key views and
//! range views all hold a shared handle to the storage of the collection
//! they came from, and every call re-reads it:
//!
//! ```rust
//! use livearray::array::SortedArrayBackedSet;
//!
//! let mut set: SortedArrayBackedSet<i32> = [1, 5, 9].into_iter().collect();
//! let middle = set.sub_set(2, 9).unwrap();
//! assert_eq!(middle.len(), 1);
//!
//! set.insert(6);
//! set.insert(8);
//! assert_eq!(middle.iter().collect::<Vec<_>>(), vec![5, 6, 8]);
//! ```
//!
//! # Thread Safety
//!
//! The collections in this module are single-writer structures. Storage is
//! shared through `Rc<RefCell<_>>`, so neither the collections nor their
//! views are `Send` or `Sync`. Use [`crate::multimap`] for shared access
//! across threads.
//!
//! # Absent Keys and Values
//!
//! There is no null in Rust. A collection whose key or value type is an
//! `Option<_>` stores `None` like any other element; every variant here
//! accepts them, as reported by [`Capabilities`].

mod index;
mod map;
mod range;
mod set;
mod storage;
mod view;

pub use index::BinarySearch;
pub use index::Comparator;
pub use index::IndexStrategy;
pub use index::LinearScan;
pub use map::ArrayBackedMap;
pub use map::ArrayMap;
pub use map::SortedArrayBackedMap;
pub use range::RangeIter;
pub use range::SortedMapRange;
pub use range::SortedSetRange;
pub use set::ArrayBackedSet;
pub use set::ArraySet;
pub use set::SortedArrayBackedSet;
pub use storage::ArrayStorage;
pub use storage::LiveIter;
pub use view::EntriesView;
pub use view::KeySetView;
pub use view::KeyView;
pub use view::ValuesView;

pub use crate::Capabilities;

static_assertions::assert_not_impl_any!(ArrayBackedMap<i32, i32>: Send, Sync);
static_assertions::assert_not_impl_any!(SortedArrayBackedSet<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(SortedSetRange<i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod capability_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_every_variant_accepts_absent_keys_and_values() {
        assert!(ArrayBackedMap::<Option<i32>, Option<i32>>::ALLOWS_NULL_KEYS);
        assert!(ArrayBackedMap::<Option<i32>, Option<i32>>::ALLOWS_NULL_VALUES);
        assert!(SortedArrayBackedMap::<Option<i32>, i32>::ALLOWS_NULL_KEYS);
        assert!(ArrayBackedSet::<Option<i32>>::ALLOWS_NULL_KEYS);
        assert!(SortedArrayBackedSet::<Option<i32>>::ALLOWS_NULL_KEYS);
    }

    #[rstest]
    fn test_absent_element_orders_first() {
        let set: SortedArrayBackedSet<Option<i32>> = [Some(2), None, Some(1)].into_iter().collect();
        assert_eq!(set.first(), Ok(None));
        assert!(set.contains(&None));
    }
}
