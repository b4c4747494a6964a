//! Live views over an array-backed map.
//!
//! Each view holds a clone of the map's shared storage handle and nothing
//! else besides its own key, if any. Every method re-reads the storage at
//! call time, so a view obtained once keeps reflecting the map.

use std::fmt;
use std::rc::Rc;

use super::index::IndexStrategy;
use super::storage::{LiveIter, SharedStorage};

/// Live view over the keys of a map.
///
/// # Examples
///
/// ```rust
/// use livearray::array::ArrayBackedMap;
///
/// let mut map = ArrayBackedMap::new();
/// let keys = map.keys();
/// assert!(keys.is_empty());
///
/// map.insert("a", 1);
/// map.insert("b", 2);
/// assert_eq!(keys.len(), 2);
///
/// keys.remove(&"a");
/// assert!(!map.contains_key(&"a"));
/// ```
pub struct KeySetView<K, V, S> {
    storage: SharedStorage<K, V, S>,
}

impl<K, V, S: IndexStrategy<K>> KeySetView<K, V, S> {
    pub(crate) const fn new(storage: SharedStorage<K, V, S>) -> Self {
        Self { storage }
    }

    /// Current number of distinct keys.
    pub fn len(&self) -> usize {
        self.storage.borrow().len()
    }

    /// Returns `true` if the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.storage.borrow().is_empty()
    }

    /// Returns `true` if `key` is currently present.
    pub fn contains(&self, key: &K) -> bool {
        self.storage.borrow().index_of_key(key).is_some()
    }

    /// Removes `key` and its value from the backing map.
    pub fn remove(&self, key: &K) -> bool {
        self.storage.borrow_mut().remove_key(key).is_some()
    }

    /// Live iterator over the keys in storage order.
    pub fn iter(&self) -> LiveIter<K, V, S, K>
    where
        K: Clone,
    {
        LiveIter::new(Rc::clone(&self.storage), 0, |key: &K, _: &V| key.clone())
    }
}

impl<K, V, S> Clone for KeySetView<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
        }
    }
}

impl<K: fmt::Debug, V, S> fmt::Debug for KeySetView<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_set()
            .entries(self.storage.borrow().keys())
            .finish()
    }
}

/// Live view over the values of a map, in storage order.
pub struct ValuesView<K, V, S> {
    storage: SharedStorage<K, V, S>,
}

impl<K, V, S> ValuesView<K, V, S> {
    pub(crate) const fn new(storage: SharedStorage<K, V, S>) -> Self {
        Self { storage }
    }

    /// Current number of values (equal to the number of keys).
    pub fn len(&self) -> usize {
        self.storage.borrow().len()
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.borrow().is_empty()
    }

    /// Returns `true` if any entry holds `value`.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.storage.borrow().index_of_value(value).is_some()
    }

    /// Live iterator over the values.
    pub fn iter(&self) -> LiveIter<K, V, S, V>
    where
        V: Clone,
    {
        LiveIter::new(Rc::clone(&self.storage), 0, |_: &K, value: &V| value.clone())
    }
}

impl<K, V, S> Clone for ValuesView<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
        }
    }
}

/// Live view over the `(key, value)` entries of a map.
pub struct EntriesView<K, V, S> {
    storage: SharedStorage<K, V, S>,
}

impl<K, V, S: IndexStrategy<K>> EntriesView<K, V, S> {
    pub(crate) const fn new(storage: SharedStorage<K, V, S>) -> Self {
        Self { storage }
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.storage.borrow().len()
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.borrow().is_empty()
    }

    /// Returns `true` if `key` is mapped to `value`.
    pub fn contains(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        let storage = self.storage.borrow();
        storage
            .index_of_key(key)
            .and_then(|index| storage.value_at(index))
            .is_some_and(|candidate| candidate == value)
    }

    /// Live iterator over the entries in storage order.
    pub fn iter(&self) -> LiveIter<K, V, S, (K, V)>
    where
        K: Clone,
        V: Clone,
    {
        LiveIter::new(Rc::clone(&self.storage), 0, |key: &K, value: &V| {
            (key.clone(), value.clone())
        })
    }
}

impl<K, V, S> Clone for EntriesView<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
        }
    }
}

/// Live view scoped to one key of a map.
///
/// The key need not be present when the view is created. Reads resolve the
/// key's position again on every call.
pub struct KeyView<K, V, S> {
    storage: SharedStorage<K, V, S>,
    key: K,
}

impl<K, V, S: IndexStrategy<K>> KeyView<K, V, S> {
    pub(crate) const fn new(storage: SharedStorage<K, V, S>, key: K) -> Self {
        Self { storage, key }
    }

    /// The key this view is scoped to.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns `true` if the key is currently mapped.
    pub fn is_present(&self) -> bool {
        self.storage.borrow().index_of_key(&self.key).is_some()
    }

    /// The current value, if the key is mapped.
    pub fn get(&self) -> Option<V>
    where
        V: Clone,
    {
        let storage = self.storage.borrow();
        let index = storage.index_of_key(&self.key)?;
        storage.value_at(index).cloned()
    }

    /// Replaces the value in place if the key is mapped, returning the old value.
    ///
    /// An absent key is left absent: a value update is not a structural
    /// modification.
    pub fn replace(&self, value: V) -> Option<V> {
        let mut storage = self.storage.borrow_mut();
        let index = storage.index_of_key(&self.key)?;
        storage.replace_value_at(index, value)
    }

    /// Removes the key from the backing map, returning its value.
    pub fn remove(&self) -> Option<V> {
        self.storage
            .borrow_mut()
            .remove_key(&self.key)
            .map(|(_, value)| value)
    }
}

impl<K: Clone, V, S> Clone for KeyView<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
            key: self.key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::array::{ArrayBackedMap, SortedArrayBackedMap};
    use rstest::rstest;

    #[rstest]
    fn test_key_set_tracks_inserts_and_removes() {
        let mut map = ArrayBackedMap::new();
        let keys = map.keys();

        map.insert('x', 1);
        map.insert('y', 2);
        assert_eq!(keys.iter().collect::<Vec<_>>(), vec!['x', 'y']);

        map.remove(&'x');
        assert_eq!(keys.iter().collect::<Vec<_>>(), vec!['y']);
        assert!(!keys.contains(&'x'));
    }

    #[rstest]
    fn test_key_set_remove_writes_through() {
        let mut map: SortedArrayBackedMap<i32, i32> = (1..=3).map(|key| (key, key)).collect();
        let keys = map.keys();
        assert!(keys.remove(&2));
        assert!(!keys.remove(&2));
        assert_eq!(map.len(), 2);
        map.insert(0, 0);
        assert_eq!(keys.iter().collect::<Vec<_>>(), vec![0, 1, 3]);
    }

    #[rstest]
    fn test_values_view_reflects_overwrite() {
        let mut map = ArrayBackedMap::new();
        let values = map.values();
        map.insert("a", 1);
        map.insert("a", 5);
        assert!(values.contains(&5));
        assert!(!values.contains(&1));
        assert_eq!(values.iter().collect::<Vec<_>>(), vec![5]);
    }

    #[rstest]
    fn test_entries_view_contains_pair() {
        let mut map = SortedArrayBackedMap::new();
        let entries = map.entries();
        map.insert(2, 'b');
        map.insert(1, 'a');
        assert!(entries.contains(&1, &'a'));
        assert!(!entries.contains(&1, &'b'));
        assert_eq!(entries.iter().collect::<Vec<_>>(), vec![(1, 'a'), (2, 'b')]);
    }

    #[rstest]
    fn test_key_view_is_rederived_per_call() {
        let mut map = ArrayBackedMap::new();
        let view = map.key_view(7);
        assert!(!view.is_present());
        assert_eq!(view.replace("ignored"), None);
        assert!(map.is_empty());

        map.insert(7, "seven");
        assert_eq!(view.get(), Some("seven"));
        assert_eq!(view.replace("SEVEN"), Some("seven"));
        assert_eq!(map.get(&7), Some("SEVEN"));

        assert_eq!(view.remove(), Some("SEVEN"));
        assert!(!map.contains_key(&7));
        assert_eq!(*view.key(), 7);
    }

    #[rstest]
    fn test_key_view_survives_shift_from_earlier_removal() {
        let mut map: ArrayBackedMap<i32, i32> = [(1, 10), (2, 20), (3, 30)].into_iter().collect();
        let view = map.key_view(3);
        map.remove(&1);
        assert_eq!(view.get(), Some(30));
    }

    #[rstest]
    fn test_key_set_debug() {
        let map: SortedArrayBackedMap<i32, ()> = [(2, ()), (1, ())].into_iter().collect();
        assert_eq!(format!("{:?}", map.keys()), "{1, 2}");
    }
}
