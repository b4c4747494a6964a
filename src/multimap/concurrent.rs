//! The concurrent multimap itself.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHasher;

use super::snapshot::MultimapSnapshot;
use super::view::{MultimapKeySet, ValueSetView};
use super::{SharedTable, SharedValues};

/// Thread-safe map from keys to sets of values.
///
/// Share it between threads with `Arc<ConcurrentMultimap<K, V>>`; every
/// operation takes `&self`.
///
/// # Examples
///
/// ```rust
/// use livearray::multimap::ConcurrentMultimap;
/// use std::collections::HashSet;
///
/// let multimap = ConcurrentMultimap::new();
/// multimap.put("a", 1);
/// multimap.put("a", 2);
/// assert_eq!(multimap.get("a").to_set(), HashSet::from([1, 2]));
/// assert_eq!(multimap.len(), 2);
///
/// multimap.remove(&"a", &1);
/// assert_eq!(multimap.get("a").to_set(), HashSet::from([2]));
/// assert_eq!(multimap.len(), 1);
/// ```
pub struct ConcurrentMultimap<K, V> {
    table: SharedTable<K, V>,
    /// Table size at which the next key creation sweeps unused sets.
    /// Only read or written under the outer write lock.
    sweep_at: AtomicUsize,
}

/// Smallest table size that triggers a sweep.
const SWEEP_FLOOR: usize = 16;

/// `true` if nothing outside the table holds `values` and it is empty.
/// Dropping such a set from the table detaches no view.
fn is_unused<V>(values: &SharedValues<V>) -> bool {
    Arc::strong_count(values) == 1 && values.read().is_empty()
}

impl<K: Eq + Hash, V: Eq + Hash> ConcurrentMultimap<K, V> {
    /// Creates an empty multimap.
    #[must_use]
    pub fn new() -> Self {
        Self::from_table(HashMap::new())
    }

    /// Creates an empty multimap with room for `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_table(HashMap::with_capacity(capacity))
    }

    fn from_table(table: HashMap<K, SharedValues<V>>) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
            sweep_at: AtomicUsize::new(SWEEP_FLOOR),
        }
    }

    /// Value set of `key`, created if absent. Called under the outer write lock.
    ///
    /// Creating a key first sweeps the table once it has grown to twice its
    /// size after the previous sweep, so empty sets left behind by dropped
    /// views cost amortized constant time and never accumulate.
    fn slot_for<'t>(
        &self,
        table: &'t mut HashMap<K, SharedValues<V>>,
        key: K,
    ) -> &'t SharedValues<V> {
        if !table.contains_key(&key) && table.len() >= self.sweep_at.load(Ordering::Relaxed) {
            let before = table.len();
            table.retain(|_, values| !is_unused(values));
            tracing::trace!(swept = before - table.len(), "dropped unused value sets");
            self.sweep_at
                .store((table.len() * 2).max(SWEEP_FLOOR), Ordering::Relaxed);
        }
        table.entry(key).or_insert_with(|| {
            tracing::trace!("created value set for new key");
            SharedValues::default()
        })
    }

    /// Drops the set of `key` if it is empty and no view holds it.
    fn prune(&self, key: &K) {
        let mut table = self.table.write();
        if table.get(key).is_some_and(is_unused) {
            table.remove(key);
        }
    }

    #[cfg(test)]
    fn table_len(&self) -> usize {
        self.table.read().len()
    }

    /// Runs `update` on the value set of `key` under its write lock,
    /// creating the set first if the key has none.
    ///
    /// The outer lock stays held (shared or exclusive) for the duration, so
    /// `update` cannot interleave with a detachment of the same key.
    fn update<R>(&self, key: K, update: impl FnOnce(&mut HashSet<V>) -> R) -> R {
        {
            let table = self.table.read();
            if let Some(values) = table.get(&key) {
                return update(&mut *values.write());
            }
        }
        let mut table = self.table.write();
        update(&mut *self.slot_for(&mut table, key).write())
    }

    /// Associates `value` with `key`. Returns `false` if it was already there.
    pub fn put(&self, key: K, value: V) -> bool {
        self.update(key, |values| values.insert(value))
    }

    /// Associates every value with `key` in one atomic step. Returns `true`
    /// if at least one value was new.
    ///
    /// The values are collected before any lock is taken.
    pub fn put_all<I: IntoIterator<Item = V>>(&self, key: K, values: I) -> bool {
        let additions: Vec<V> = values.into_iter().collect();
        if additions.is_empty() {
            return false;
        }
        self.update(key, |current| {
            additions
                .into_iter()
                .fold(false, |changed, value| current.insert(value) | changed)
        })
    }

    /// Removes one value from `key`. Returns `false` if it was not there.
    ///
    /// A value set emptied this way stays attached to every view of the
    /// key. It is dropped from the table only when no view holds it.
    pub fn remove(&self, key: &K, value: &V) -> bool {
        let (removed, emptied) = {
            let table = self.table.read();
            let Some(values) = table.get(key) else {
                return false;
            };
            let mut values = values.write();
            let removed = values.remove(value);
            (removed, removed && values.is_empty())
        };
        if emptied {
            self.prune(key);
        }
        removed
    }

    /// Removes `key` and returns its values.
    ///
    /// The key's value set is emptied and discarded: views obtained before
    /// this call see an empty set from now on and do not follow later puts.
    pub fn remove_all(&self, key: &K) -> HashSet<V> {
        let mut table = self.table.write();
        let Some(values) = table.remove(key) else {
            return HashSet::new();
        };
        let removed = std::mem::take(&mut *values.write());
        tracing::trace!(removed = removed.len(), "detached value set");
        removed
    }

    /// Replaces `old` with `new` under `key`, atomically. Returns `false`
    /// (and changes nothing) if `old` was not associated with `key`.
    pub fn replace_value(&self, key: &K, old: &V, new: V) -> bool {
        let table = self.table.read();
        let Some(values) = table.get(key) else {
            return false;
        };
        let mut values = values.write();
        if !values.remove(old) {
            return false;
        }
        values.insert(new);
        true
    }

    /// Replaces every value of `key` atomically, returning the previous values.
    ///
    /// The key keeps its value set object, so existing views observe the
    /// replacement.
    pub fn replace_values<I: IntoIterator<Item = V>>(&self, key: K, values: I) -> HashSet<V> {
        let replacement: HashSet<V> = values.into_iter().collect();
        self.update(key, |current| std::mem::replace(current, replacement))
    }

    /// Live view of the values of `key`.
    ///
    /// If `key` has no value set yet, an empty one is created so that the
    /// view observes values put later. Once every view of a key with no
    /// values is dropped, its empty set becomes eligible for removal.
    pub fn get(&self, key: K) -> ValueSetView<K, V>
    where
        K: Clone,
    {
        {
            let table = self.table.read();
            if let Some(values) = table.get(&key) {
                return ValueSetView::new(key, Arc::clone(values));
            }
        }
        let mut table = self.table.write();
        let values = Arc::clone(self.slot_for(&mut table, key.clone()));
        ValueSetView::new(key, values)
    }

    /// Discards every key. All outstanding views become detached and empty.
    pub fn clear(&self) {
        let mut table = self.table.write();
        let detached = table.len();
        for (_, values) in table.drain() {
            values.write().clear();
        }
        tracing::trace!(detached, "cleared multimap");
    }

    /// Returns `true` if `key` holds at least one value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.table
            .read()
            .get(key)
            .is_some_and(|values| !values.read().is_empty())
    }

    /// Returns `true` if any key holds `value`.
    pub fn contains_value(&self, value: &V) -> bool {
        self.table
            .read()
            .values()
            .any(|values| values.read().contains(value))
    }

    /// Returns `true` if `key` holds `value`.
    pub fn contains_entry(&self, key: &K, value: &V) -> bool {
        self.table
            .read()
            .get(key)
            .is_some_and(|values| values.read().contains(value))
    }

    /// Total number of `(key, value)` associations.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .values()
            .map(|values| values.read().len())
            .sum()
    }

    /// Returns `true` if no key holds any value.
    pub fn is_empty(&self) -> bool {
        self.table
            .read()
            .values()
            .all(|values| values.read().is_empty())
    }

    /// Number of keys holding at least one value.
    pub fn key_count(&self) -> usize {
        self.key_set().len()
    }

    /// Live view over the keys holding at least one value.
    pub fn key_set(&self) -> MultimapKeySet<K, V> {
        MultimapKeySet::new(Arc::clone(&self.table))
    }

    /// Every `(key, value)` association at the time of the call.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let table = self.table.read();
        table
            .iter()
            .flat_map(|(key, values)| {
                values
                    .read()
                    .iter()
                    .map(|value| (key.clone(), value.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Copies the non-empty key/value-set mapping out of the multimap.
    pub(crate) fn to_map(&self) -> HashMap<K, HashSet<V>>
    where
        K: Clone,
        V: Clone,
    {
        let table = self.table.read();
        table
            .iter()
            .filter_map(|(key, values)| {
                let values = values.read();
                (!values.is_empty()).then(|| (key.clone(), values.clone()))
            })
            .collect()
    }

    /// Independent copy of the contents.
    pub fn snapshot(&self) -> MultimapSnapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        MultimapSnapshot::from(self.to_map())
    }

    /// Builds a multimap from a snapshot. No storage is shared with the
    /// multimap the snapshot was taken from.
    pub fn from_snapshot(snapshot: MultimapSnapshot<K, V>) -> Self {
        let table = snapshot
            .into_entries()
            .into_iter()
            .map(|(key, values)| (key, Arc::new(RwLock::new(values))))
            .collect();
        Self::from_table(table)
    }

    /// Snapshot-and-restore copy: equal contents, independent views.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::multimap::ConcurrentMultimap;
    ///
    /// let original: ConcurrentMultimap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let copy = original.reserialize();
    /// assert_eq!(original, copy);
    ///
    /// copy.put("a", 3);
    /// assert!(!original.get("a").contains(&3));
    /// ```
    #[must_use]
    pub fn reserialize(&self) -> Self
    where
        K: Clone,
        V: Clone,
    {
        Self::from_snapshot(self.snapshot())
    }

    /// Order-independent hash of the contents.
    ///
    /// The sum over every key with values of `hash(key) ^ hash(values)`,
    /// where `hash(values)` is the wrapping sum of the element hashes.
    /// Element hashes use a fixed hasher, so equal multimaps hash equally
    /// in every process.
    pub fn content_hash(&self) -> u64 {
        let table = self.table.read();
        table
            .iter()
            .filter_map(|(key, values)| {
                let values = values.read();
                (!values.is_empty()).then(|| {
                    let values_hash = values
                        .iter()
                        .map(element_hash)
                        .fold(0_u64, u64::wrapping_add);
                    element_hash(key) ^ values_hash
                })
            })
            .fold(0_u64, u64::wrapping_add)
    }
}

fn element_hash<T: Hash + ?Sized>(element: &T) -> u64 {
    let mut hasher = FxHasher::default();
    element.hash(&mut hasher);
    hasher.finish()
}

impl<K: Eq + Hash, V: Eq + Hash> Default for ConcurrentMultimap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Multimaps are equal when their non-empty key/value-set mappings are.
impl<K: Eq + Hash + Clone, V: Eq + Hash + Clone> PartialEq for ConcurrentMultimap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.table, &other.table) {
            return true;
        }
        // Each side is copied under its own locks; never hold both at once.
        let left = self.to_map();
        let right = other.to_map();
        left == right
    }
}

impl<K: Eq + Hash + Clone, V: Eq + Hash + Clone> Eq for ConcurrentMultimap<K, V> {}

impl<K: Eq + Hash, V: Eq + Hash> Hash for ConcurrentMultimap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl<K, V> fmt::Debug for ConcurrentMultimap<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.to_map()).finish()
    }
}

impl<K: Eq + Hash, V: Eq + Hash> FromIterator<(K, V)> for ConcurrentMultimap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let multimap = Self::new();
        for (key, value) in iter {
            multimap.put(key, value);
        }
        multimap
    }
}

impl<K: Eq + Hash, V: Eq + Hash> Extend<(K, V)> for ConcurrentMultimap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V> crate::Capabilities for ConcurrentMultimap<K, V> {
    const ALLOWS_NULL_KEYS: bool = true;
    const ALLOWS_NULL_VALUES: bool = true;
}
