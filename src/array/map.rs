//! Array-backed maps.
//!
//! [`ArrayMap`] is one map type parameterized by its [`IndexStrategy`];
//! the two variants are exposed as aliases:
//!
//! - [`ArrayBackedMap`]: [`LinearScan`], iteration in insertion order.
//! - [`SortedArrayBackedMap`]: [`BinarySearch`], iteration in key order,
//!   with range views ([`head_map`](ArrayMap::head_map),
//!   [`tail_map`](ArrayMap::tail_map), [`sub_map`](ArrayMap::sub_map)).
//!
//! Every view handed out by a map ([`keys`](ArrayMap::keys),
//! [`values`](ArrayMap::values), [`entries`](ArrayMap::entries),
//! [`key_view`](ArrayMap::key_view) and the range views) shares the map's
//! storage and observes later mutations without being re-fetched.
//!
//! # Examples
//!
//! ```rust
//! use livearray::array::{ArrayBackedMap, SortedArrayBackedMap};
//!
//! let mut insertion_ordered = ArrayBackedMap::new();
//! insertion_ordered.insert("pear", 3);
//! insertion_ordered.insert("apple", 1);
//! let keys: Vec<&str> = insertion_ordered.keys().iter().collect();
//! assert_eq!(keys, vec!["pear", "apple"]);
//!
//! let mut sorted = SortedArrayBackedMap::new();
//! sorted.insert("pear", 3);
//! sorted.insert("apple", 1);
//! let keys: Vec<&str> = sorted.keys().iter().collect();
//! assert_eq!(keys, vec!["apple", "pear"]);
//! ```

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::Capabilities;
use super::index::{BinarySearch, Comparator, IndexStrategy, LinearScan};
use super::range::{Bounds, SortedMapRange};
use super::storage::{ArrayStorage, LiveIter, SharedStorage};
use super::view::{EntriesView, KeySetView, KeyView, ValuesView};
use crate::CollectionError;

/// Map over parallel key/value arrays.
///
/// Not thread-safe: the storage is shared through `Rc<RefCell<_>>`, so the
/// map and its views are neither `Send` nor `Sync`.
pub struct ArrayMap<K, V, S> {
    storage: SharedStorage<K, V, S>,
}

/// Insertion-ordered map located by linear scan.
pub type ArrayBackedMap<K, V> = ArrayMap<K, V, LinearScan>;

/// Key-ordered map located by binary search.
pub type SortedArrayBackedMap<K, V> = ArrayMap<K, V, BinarySearch<K>>;

impl<K, V, S: IndexStrategy<K> + Default> ArrayMap<K, V, S> {
    /// Creates an empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::array::ArrayBackedMap;
    ///
    /// let map: ArrayBackedMap<String, i32> = ArrayBackedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_storage(ArrayStorage::with_strategy(S::default()))
    }

    /// Creates an empty map able to hold `capacity` entries without growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_storage(ArrayStorage::with_capacity_and_strategy(
            capacity,
            S::default(),
        ))
    }
}

impl<K, V, S: IndexStrategy<K>> ArrayMap<K, V, S> {
    fn from_storage(storage: ArrayStorage<K, V, S>) -> Self {
        Self {
            storage: Rc::new(RefCell::new(storage)),
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.borrow().len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.borrow().is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.storage.borrow().index_of_key(key).is_some()
    }

    /// Returns a clone of the value for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::array::ArrayBackedMap;
    ///
    /// let mut map = ArrayBackedMap::new();
    /// map.insert(1, "one");
    /// assert_eq!(map.get(&1), Some("one"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let storage = self.storage.borrow();
        let index = storage.index_of_key(key)?;
        storage.value_at(index).cloned()
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.storage.borrow_mut().upsert(key, value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.storage
            .borrow_mut()
            .remove_key(key)
            .map(|(_, value)| value)
    }

    /// Returns `true` if any entry holds `value`. Always a linear scan.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.storage.borrow().index_of_value(value).is_some()
    }

    /// Removes every entry. Outstanding views become empty.
    pub fn clear(&mut self) {
        self.storage.borrow_mut().clear();
    }

    /// Live iterator over `(key, value)` pairs in storage order.
    pub fn iter(&self) -> LiveIter<K, V, S, (K, V)>
    where
        K: Clone,
        V: Clone,
    {
        LiveIter::new(Rc::clone(&self.storage), 0, |key: &K, value: &V| {
            (key.clone(), value.clone())
        })
    }

    /// Live view over the keys.
    pub fn keys(&self) -> KeySetView<K, V, S> {
        KeySetView::new(Rc::clone(&self.storage))
    }

    /// Live view over the values.
    pub fn values(&self) -> ValuesView<K, V, S> {
        ValuesView::new(Rc::clone(&self.storage))
    }

    /// Live view over the entries.
    pub fn entries(&self) -> EntriesView<K, V, S> {
        EntriesView::new(Rc::clone(&self.storage))
    }

    /// Live view scoped to a single key, present or not.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::array::ArrayBackedMap;
    ///
    /// let mut map = ArrayBackedMap::new();
    /// let view = map.key_view("a");
    /// assert_eq!(view.get(), None);
    ///
    /// map.insert("a", 1);
    /// assert_eq!(view.get(), Some(1));
    /// ```
    pub fn key_view(&self, key: K) -> KeyView<K, V, S> {
        KeyView::new(Rc::clone(&self.storage), key)
    }
}

impl<K, V> ArrayMap<K, V, BinarySearch<K>> {
    /// Creates an empty map ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::array::SortedArrayBackedMap;
    ///
    /// let mut map = SortedArrayBackedMap::with_comparator(|left: &i32, right: &i32| right.cmp(left));
    /// map.insert(1, 'a');
    /// map.insert(3, 'c');
    /// assert_eq!(map.first_key(), Ok(3));
    /// ```
    pub fn with_comparator<F>(comparator: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + 'static,
    {
        Self::from_storage(ArrayStorage::with_strategy(BinarySearch::with_comparator(
            Comparator::custom(comparator),
        )))
    }

    /// The ordering of this map.
    pub fn comparator(&self) -> Comparator<K> {
        self.storage.borrow().strategy().comparator().clone()
    }
}

impl<K: Clone, V> ArrayMap<K, V, BinarySearch<K>> {
    /// The smallest key.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the map is empty.
    pub fn first_key(&self) -> Result<K, CollectionError> {
        Bounds::unbounded().first(&self.storage.borrow())
    }

    /// The largest key.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the map is empty.
    pub fn last_key(&self) -> Result<K, CollectionError> {
        Bounds::unbounded().last(&self.storage.borrow())
    }

    /// Live view of keys in `[from, to)`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if `from` orders after `to`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::array::SortedArrayBackedMap;
    ///
    /// let mut map: SortedArrayBackedMap<i32, char> =
    ///     [(1, 'a'), (3, 'c'), (5, 'e')].into_iter().collect();
    /// let window = map.sub_map(2, 5).unwrap();
    /// assert_eq!(window.len(), 1);
    ///
    /// map.insert(4, 'd');
    /// assert_eq!(window.len(), 2);
    /// ```
    pub fn sub_map(&self, from: K, to: K) -> Result<SortedMapRange<K, V>, CollectionError> {
        self.range(Some(from), Some(to))
    }

    /// Live view of keys strictly below `to`.
    ///
    /// # Errors
    ///
    /// Never fails at the root; the `Result` matches the view composition API.
    pub fn head_map(&self, to: K) -> Result<SortedMapRange<K, V>, CollectionError> {
        self.range(None, Some(to))
    }

    /// Live view of keys at or above `from`.
    ///
    /// # Errors
    ///
    /// Never fails at the root; the `Result` matches the view composition API.
    pub fn tail_map(&self, from: K) -> Result<SortedMapRange<K, V>, CollectionError> {
        self.range(Some(from), None)
    }

    fn range(
        &self,
        from: Option<K>,
        to: Option<K>,
    ) -> Result<SortedMapRange<K, V>, CollectionError> {
        let bounds = {
            let storage = self.storage.borrow();
            Bounds::unbounded().narrow(storage.strategy(), from, to)?
        };
        Ok(SortedMapRange::new(Rc::clone(&self.storage), bounds))
    }
}

impl<K, V, S: IndexStrategy<K> + Default> Default for ArrayMap<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy: the clone gets its own storage, and views of the original do
/// not observe it.
impl<K: Clone, V: Clone, S: Clone> Clone for ArrayMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::new(RefCell::new(self.storage.borrow().clone())),
        }
    }
}

/// Maps are equal when they hold the same key/value pairs, in any order.
impl<K, V: PartialEq, S: IndexStrategy<K>> PartialEq for ArrayMap<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.storage, &other.storage) {
            return true;
        }
        let left = self.storage.borrow();
        let right = other.storage.borrow();
        left.len() == right.len()
            && left
                .keys()
                .iter()
                .zip(left.values())
                .all(|(key, value)| {
                    right
                        .index_of_key(key)
                        .and_then(|index| right.value_at(index))
                        .is_some_and(|candidate| candidate == value)
                })
    }
}

impl<K, V: Eq, S: IndexStrategy<K>> Eq for ArrayMap<K, V, S> {}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ArrayMap<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = self.storage.borrow();
        formatter
            .debug_map()
            .entries(storage.keys().iter().zip(storage.values()))
            .finish()
    }
}

impl<K, V, S: IndexStrategy<K> + Default> FromIterator<(K, V)> for ArrayMap<K, V, S> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, S: IndexStrategy<K>> Extend<(K, V)> for ArrayMap<K, V, S> {
    /// The source is drained before the storage is borrowed, so it may be
    /// a live view of this same map.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let incoming: Vec<(K, V)> = iter.into_iter().collect();
        let mut storage = self.storage.borrow_mut();
        for (key, value) in incoming {
            storage.upsert(key, value);
        }
    }
}

impl<K, V, S> Capabilities for ArrayMap<K, V, S> {
    const ALLOWS_NULL_KEYS: bool = true;
    const ALLOWS_NULL_VALUES: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_insert_returns_previous_value() {
        let mut map = ArrayBackedMap::new();
        assert_eq!(map.insert("a", 1), None);
        assert_eq!(map.insert("a", 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"a"), Some(2));
    }

    #[rstest]
    fn test_linear_map_preserves_insertion_order() {
        let map: ArrayBackedMap<i32, char> = [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
        let entries: Vec<(i32, char)> = map.iter().collect();
        assert_eq!(entries, vec![(3, 'c'), (1, 'a'), (2, 'b')]);
    }

    #[rstest]
    fn test_sorted_map_orders_keys() {
        let map: SortedArrayBackedMap<i32, char> =
            [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
        let entries: Vec<(i32, char)> = map.iter().collect();
        assert_eq!(entries, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
    }

    #[rstest]
    fn test_remove_compacts_storage() {
        let mut map: SortedArrayBackedMap<i32, i32> = (0..5).map(|key| (key, key * 10)).collect();
        assert_eq!(map.remove(&2), Some(20));
        assert_eq!(map.remove(&2), None);
        let keys: Vec<i32> = map.keys().iter().collect();
        assert_eq!(keys, vec![0, 1, 3, 4]);
    }

    #[rstest]
    fn test_contains_value_scans_values() {
        let map: SortedArrayBackedMap<i32, &str> = [(2, "two"), (1, "one")].into_iter().collect();
        assert!(map.contains_value(&"two"));
        assert!(!map.contains_value(&"three"));
    }

    #[rstest]
    fn test_equality_ignores_insertion_order() {
        let left: ArrayBackedMap<i32, i32> = [(1, 10), (2, 20)].into_iter().collect();
        let right: ArrayBackedMap<i32, i32> = [(2, 20), (1, 10)].into_iter().collect();
        assert_eq!(left, right);
    }

    #[rstest]
    fn test_equality_detects_different_values() {
        let left: ArrayBackedMap<i32, i32> = [(1, 10)].into_iter().collect();
        let right: ArrayBackedMap<i32, i32> = [(1, 11)].into_iter().collect();
        assert_ne!(left, right);
    }

    #[rstest]
    fn test_clone_is_detached_from_original_views() {
        let mut original: ArrayBackedMap<i32, i32> = [(1, 1)].into_iter().collect();
        let keys = original.keys();
        let mut copy = original.clone();

        copy.insert(2, 2);
        assert_eq!(keys.len(), 1);

        original.insert(3, 3);
        assert_eq!(keys.len(), 2);
        assert_eq!(copy.len(), 2);
    }

    #[rstest]
    fn test_first_and_last_key_on_empty_map() {
        let map: SortedArrayBackedMap<i32, i32> = SortedArrayBackedMap::new();
        assert_eq!(map.first_key(), Err(CollectionError::EmptyCollection));
        assert_eq!(map.last_key(), Err(CollectionError::EmptyCollection));
    }

    #[rstest]
    fn test_custom_comparator_orders_descending() {
        let mut map = SortedArrayBackedMap::with_comparator(|left: &i32, right: &i32| right.cmp(left));
        for key in [2, 9, 4] {
            map.insert(key, ());
        }
        let keys: Vec<i32> = map.keys().iter().collect();
        assert_eq!(keys, vec![9, 4, 2]);
        assert!(!map.comparator().is_natural());
    }

    #[rstest]
    fn test_sub_map_rejects_reversed_bounds() {
        let map: SortedArrayBackedMap<i32, i32> = SortedArrayBackedMap::new();
        assert_eq!(map.sub_map(5, 1).err(), Some(CollectionError::InvalidRange));
    }

    #[rstest]
    fn test_optional_keys_are_accepted() {
        let mut map: SortedArrayBackedMap<Option<i32>, Option<&str>> = SortedArrayBackedMap::new();
        map.insert(Some(1), None);
        map.insert(None, Some("absent"));
        assert_eq!(map.first_key(), Ok(None));
        assert_eq!(map.get(&Some(1)), Some(None));
        assert!(SortedArrayBackedMap::<Option<i32>, Option<&str>>::ALLOWS_NULL_KEYS);
    }

    #[rstest]
    fn test_debug_lists_entries() {
        let map: SortedArrayBackedMap<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[rstest]
    fn test_extend_from_own_live_view() {
        let mut map: SortedArrayBackedMap<i32, i32> = [(1, 1), (2, 2)].into_iter().collect();
        let entries = map.iter();
        map.extend(entries.map(|(key, value)| (key + 10, value)));

        let keys: Vec<i32> = map.keys().iter().collect();
        assert_eq!(keys, vec![1, 2, 11, 12]);
    }

    #[rstest]
    fn test_clear_empties_views() {
        let mut map: ArrayBackedMap<i32, i32> = [(1, 1), (2, 2)].into_iter().collect();
        let values = map.values();
        map.clear();
        assert!(values.is_empty());
        assert!(map.is_empty());
    }
}
