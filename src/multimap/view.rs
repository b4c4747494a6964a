//! Live views into a [`ConcurrentMultimap`](super::ConcurrentMultimap).

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use super::{SharedTable, SharedValues};

/// Live, thread-safe view of the values of one key.
///
/// The view shares the key's value set with the multimap. Writes through
/// the view are writes to the multimap, and writes to the multimap are
/// visible through the view, until the key is detached by
/// [`remove_all`](super::ConcurrentMultimap::remove_all) or
/// [`clear`](super::ConcurrentMultimap::clear). A detached view keeps
/// working on its own discarded set.
///
/// Iteration works over a copy taken at the start of the call, so it never
/// observes a half-applied write and never blocks writers while the caller
/// consumes it.
#[derive(Clone)]
pub struct ValueSetView<K, V> {
    key: K,
    values: SharedValues<V>,
}

impl<K, V: Eq + Hash> ValueSetView<K, V> {
    pub(crate) const fn new(key: K, values: SharedValues<V>) -> Self {
        Self { key, values }
    }

    /// The key this view was obtained for.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Returns `true` if `value` is present.
    pub fn contains(&self, value: &V) -> bool {
        self.values.read().contains(value)
    }

    /// Adds `value` under this view's key. Returns `false` if it was present.
    pub fn insert(&self, value: V) -> bool {
        self.values.write().insert(value)
    }

    /// Removes `value`. Returns `false` if it was not present.
    pub fn remove(&self, value: &V) -> bool {
        self.values.write().remove(value)
    }

    /// Copy of the current values.
    pub fn to_set(&self) -> HashSet<V>
    where
        V: Clone,
    {
        self.values.read().clone()
    }

    /// Copy of the current values, in unspecified order.
    pub fn to_vec(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.values.read().iter().cloned().collect()
    }

    /// Iterates over a copy of the values taken now.
    pub fn iter(&self) -> std::vec::IntoIter<V>
    where
        V: Clone,
    {
        self.to_vec().into_iter()
    }

    /// Calls `action` on each value of a copy taken now.
    ///
    /// No lock is held while `action` runs, so it may write to the
    /// multimap, including this key.
    pub fn for_each<F: FnMut(&V)>(&self, action: F)
    where
        V: Clone,
    {
        self.to_vec().iter().for_each(action);
    }

    /// Returns `true` if both views observe the same value set object.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ValueSetView<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ValueSetView")
            .field("key", &self.key)
            .field("values", &*self.values.read())
            .finish()
    }
}

/// Live view of the keys of a multimap that hold at least one value.
#[derive(Clone)]
pub struct MultimapKeySet<K, V> {
    table: SharedTable<K, V>,
}

impl<K: Eq + Hash, V> MultimapKeySet<K, V> {
    pub(crate) const fn new(table: SharedTable<K, V>) -> Self {
        Self { table }
    }

    /// Number of keys with at least one value.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .values()
            .filter(|values| !values.read().is_empty())
            .count()
    }

    /// Returns `true` if no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` holds at least one value.
    pub fn contains(&self, key: &K) -> bool {
        self.table
            .read()
            .get(key)
            .is_some_and(|values| !values.read().is_empty())
    }

    /// Copy of the current keys, in unspecified order.
    pub fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.table
            .read()
            .iter()
            .filter(|(_, values)| !values.read().is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Iterates over a copy of the keys taken now.
    pub fn iter(&self) -> std::vec::IntoIter<K>
    where
        K: Clone,
    {
        self.to_vec().into_iter()
    }
}

impl<K: Eq + Hash + Clone + fmt::Debug, V> fmt::Debug for MultimapKeySet<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.to_vec()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::super::ConcurrentMultimap;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn test_view_insert_writes_through() {
        let multimap = ConcurrentMultimap::new();
        let view = multimap.get("k");
        assert!(view.insert(1));
        assert!(!view.insert(1));
        assert!(multimap.contains_entry(&"k", &1));
        assert_eq!(multimap.len(), 1);
    }

    #[rstest]
    fn test_view_remove_writes_through() {
        let multimap: ConcurrentMultimap<&str, i32> = [("k", 1), ("k", 2)].into_iter().collect();
        let view = multimap.get("k");
        assert!(view.remove(&1));
        assert!(!multimap.contains_entry(&"k", &1));
    }

    #[rstest]
    fn test_iteration_is_a_copy() {
        let multimap: ConcurrentMultimap<&str, i32> = [("k", 1)].into_iter().collect();
        let view = multimap.get("k");
        let iter = view.iter();
        multimap.put("k", 2);
        assert_eq!(iter.collect::<Vec<_>>(), vec![1]);
        assert_eq!(view.to_set(), HashSet::from([1, 2]));
    }

    #[rstest]
    fn test_for_each_visits_every_value() {
        let multimap: ConcurrentMultimap<&str, i32> =
            [("k", 1), ("k", 2), ("k", 3)].into_iter().collect();
        let mut total = 0;
        multimap.get("k").for_each(|value| total += value);
        assert_eq!(total, 6);
    }

    #[rstest]
    fn test_for_each_action_may_write_same_key() {
        let multimap: ConcurrentMultimap<&str, i32> = [("k", 1), ("k", 2)].into_iter().collect();
        let view = multimap.get("k");
        view.for_each(|value| {
            multimap.put("k", value * 10);
            assert!(multimap.contains_key(&"k"));
        });

        assert_eq!(view.to_set(), HashSet::from([1, 2, 10, 20]));
        assert_eq!(multimap.len(), 4);
    }

    #[rstest]
    fn test_views_of_same_key_share_storage() {
        let multimap: ConcurrentMultimap<&str, i32> = ConcurrentMultimap::new();
        let first = multimap.get("k");
        let second = multimap.get("k");
        assert!(first.shares_storage_with(&second));
        assert!(!first.shares_storage_with(&multimap.get("other")));
        assert_eq!(*first.key(), "k");
    }

    #[rstest]
    fn test_key_set_is_live_and_skips_empty_sets() {
        let multimap = ConcurrentMultimap::new();
        let keys = multimap.key_set();
        assert!(keys.is_empty());

        multimap.put("a", 1);
        let _ = multimap.get("b");
        assert_eq!(keys.len(), 1);
        assert!(keys.contains(&"a"));
        assert!(!keys.contains(&"b"));

        multimap.put("b", 2);
        let mut listed = keys.iter().collect::<Vec<_>>();
        listed.sort_unstable();
        assert_eq!(listed, vec!["a", "b"]);
    }

    #[rstest]
    fn test_view_debug_output() {
        let multimap: ConcurrentMultimap<&str, i32> = [("k", 1)].into_iter().collect();
        assert_eq!(
            format!("{:?}", multimap.get("k")),
            r#"ValueSetView { key: "k", values: {1} }"#
        );
    }
}
