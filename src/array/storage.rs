//! Ordered collection engine: parallel key/value arrays with shifting
//! insert and remove.
//!
//! [`ArrayStorage`] is the single backing store behind every map, set and
//! view in [`crate::array`]. Maps store one value per key; sets store `()`.
//! Where a key lives is decided by the configured [`IndexStrategy`].
//!
//! # Time Complexity
//!
//! | Operation             | `LinearScan` | `BinarySearch` |
//! |-----------------------|--------------|----------------|
//! | `index_of_key`        | O(n)         | O(log n)       |
//! | `index_of_value`      | O(n)         | O(n)           |
//! | `insertion_index_for` | O(1)         | O(log n)       |
//! | `insert_at`           | O(n)*        | O(n)           |
//! | `remove_at`           | O(n)         | O(n)           |
//!
//! \* O(1) amortized when appending at `len`.

use std::cell::RefCell;
use std::rc::Rc;

use super::index::IndexStrategy;
use crate::CollectionError;

/// Capacity allocated on the first insert into an empty storage.
const MINIMUM_CAPACITY: usize = 4;

/// Shared, interior-mutable handle to a storage.
///
/// Owners and views clone this handle; none of them copies the arrays.
pub(crate) type SharedStorage<K, V, S> = Rc<RefCell<ArrayStorage<K, V, S>>>;

/// Parallel arrays of keys and values located through an [`IndexStrategy`].
///
/// `keys.len() == values.len()` at all times.
///
/// # Examples
///
/// ```rust
/// use livearray::array::{ArrayStorage, LinearScan};
///
/// let mut storage = ArrayStorage::with_strategy(LinearScan);
/// storage.upsert("b", 2);
/// storage.upsert("a", 1);
///
/// assert_eq!(storage.keys(), &["b", "a"]);
/// assert_eq!(storage.index_of_key(&"a"), Some(1));
/// assert_eq!(storage.index_of_value(&2), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct ArrayStorage<K, V, S> {
    keys: Vec<K>,
    values: Vec<V>,
    strategy: S,
}

impl<K, V, S> ArrayStorage<K, V, S> {
    /// Creates an empty storage. Nothing is allocated until the first insert.
    #[must_use]
    pub const fn with_strategy(strategy: S) -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            strategy,
        }
    }

    /// Creates an empty storage able to hold `capacity` entries without growing.
    #[must_use]
    pub fn with_capacity_and_strategy(capacity: usize, strategy: S) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            strategy,
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Entries that fit before the next growth.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.keys.capacity().min(self.values.capacity())
    }

    /// The key array, in storage order.
    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// The value array, parallel to [`keys`](Self::keys).
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// The key at `index`.
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    /// The value at `index`.
    #[inline]
    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// The configured index strategy.
    #[inline]
    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Inserts an entry at `index`, shifting everything at and after it up by one.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_at(&mut self, index: usize, key: K, value: V) {
        self.grow_if_full();
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Removes the entry at `index`, shifting later entries down by one.
    ///
    /// Returns `None` if `index` is out of bounds.
    pub fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        if index >= self.keys.len() {
            return None;
        }
        Some((self.keys.remove(index), self.values.remove(index)))
    }

    /// Overwrites the value at `index` in place, returning the previous one.
    pub fn replace_value_at(&mut self, index: usize, value: V) -> Option<V> {
        self.values
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }

    /// Removes every entry. Capacity is kept.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /// Releases unused capacity.
    pub fn shrink_to_fit(&mut self) {
        self.keys.shrink_to_fit();
        self.values.shrink_to_fit();
    }

    fn grow_if_full(&mut self) {
        let length = self.keys.len();
        if length < self.capacity() {
            return;
        }
        let additional = length.max(MINIMUM_CAPACITY);
        self.keys.reserve_exact(additional);
        self.values.reserve_exact(additional);
    }
}

impl<K, V: PartialEq, S> ArrayStorage<K, V, S> {
    /// Position of the first entry holding `value`. Values are never assumed
    /// ordered, so this is always a linear scan.
    pub fn index_of_value(&self, value: &V) -> Option<usize> {
        self.values.iter().position(|candidate| candidate == value)
    }
}

impl<K, V, S: IndexStrategy<K>> ArrayStorage<K, V, S> {
    /// Position of `key`, located by the index strategy.
    #[inline]
    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.strategy.index_of(&self.keys, key)
    }

    /// Position at which an absent `key` must be inserted.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::ContractViolation`] if `key` is present.
    #[inline]
    pub fn insertion_index_for(&self, key: &K) -> Result<usize, CollectionError> {
        self.strategy.insertion_index(&self.keys, key)
    }

    /// Inserts or overwrites the value for `key`, returning the previous value.
    pub fn upsert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(index) = self.index_of_key(&key) {
            return self.replace_value_at(index, value);
        }
        match self.insertion_index_for(&key) {
            Ok(index) => {
                self.insert_at(index, key, value);
                None
            }
            Err(error) => self.recover_from_violation(error, value),
        }
    }

    /// Removes the entry for `key`, returning it.
    pub fn remove_key(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.index_of_key(key)?;
        self.remove_at(index)
    }

    /// Reached only when a comparator is not a total order: the key was not
    /// found by `index_of_key` but was found by `insertion_index_for`.
    fn recover_from_violation(&mut self, error: CollectionError, value: V) -> Option<V> {
        if cfg!(debug_assertions) {
            panic!("{error}");
        }
        tracing::error!(%error, "index strategy contract violated; overwriting in place");
        let CollectionError::ContractViolation { index } = error else {
            return None;
        };
        self.replace_value_at(index, value)
    }
}

/// Lazy iterator over a shared storage.
///
/// Every call to `next` borrows the storage afresh and reads the entry at
/// the cursor, so structural changes made between calls are visible: an
/// insert before the cursor repeats an element, a removal before it skips
/// one. No snapshot is taken.
pub struct LiveIter<K, V, S, R> {
    storage: SharedStorage<K, V, S>,
    position: usize,
    project: fn(&K, &V) -> R,
}

impl<K, V, S, R> LiveIter<K, V, S, R> {
    pub(crate) const fn new(
        storage: SharedStorage<K, V, S>,
        position: usize,
        project: fn(&K, &V) -> R,
    ) -> Self {
        Self {
            storage,
            position,
            project,
        }
    }
}

impl<K, V, S, R> Iterator for LiveIter<K, V, S, R> {
    type Item = R;

    fn next(&mut self) -> Option<Self::Item> {
        let storage = self.storage.borrow();
        let key = storage.key_at(self.position)?;
        let value = storage.value_at(self.position)?;
        let item = (self.project)(key, value);
        self.position += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.storage.borrow().len().saturating_sub(self.position);
        (remaining, None)
    }
}
