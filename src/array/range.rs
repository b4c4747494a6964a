//! Live range views over sorted array-backed collections.
//!
//! A range view is a pair of optional bounds over the same storage as its
//! source: `from` is inclusive, `to` is exclusive, and `None` leaves that
//! side open. Boundary positions are resolved by binary search on the
//! backing storage at every call, never cached.
//!
//! # Boundary Resolution
//!
//! ```text
//!   keys:     [ 1, 3, 4, 5, 8 ]
//!   from = 2  ──► lower = insertion_point(2) = 1
//!   to   = 5  ──► upper = insertion_point(5) = 3
//!   window  = keys[1..3] = [3, 4]
//! ```
//!
//! # Consistency
//!
//! Iterators take no snapshot. An insert or removal anywhere in the backing
//! collection between two `next` calls shifts positions and is visible to
//! the running iterator.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::index::BinarySearch;
use super::storage::{ArrayStorage, SharedStorage};
use crate::CollectionError;

type SortedStorage<K, V> = ArrayStorage<K, V, BinarySearch<K>>;

/// Optional `[from, to)` bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bounds<K> {
    from: Option<K>,
    to: Option<K>,
}

impl<K> Bounds<K> {
    pub(crate) const fn unbounded() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    /// Index of the first key inside the window.
    fn lower_index<V>(&self, storage: &SortedStorage<K, V>) -> usize {
        self.from.as_ref().map_or(0, |from| {
            storage.strategy().insertion_point(storage.keys(), from)
        })
    }

    /// Index one past the last key inside the window.
    fn upper_index<V>(&self, storage: &SortedStorage<K, V>) -> usize {
        self.to.as_ref().map_or(storage.len(), |to| {
            storage.strategy().insertion_point(storage.keys(), to)
        })
    }

    fn len<V>(&self, storage: &SortedStorage<K, V>) -> usize {
        self.upper_index(storage)
            .saturating_sub(self.lower_index(storage))
    }

    fn contains(&self, strategy: &BinarySearch<K>, key: &K) -> bool {
        let above_from = self
            .from
            .as_ref()
            .is_none_or(|from| strategy.compare(key, from) != Ordering::Less);
        let below_to = self
            .to
            .as_ref()
            .is_none_or(|to| strategy.compare(key, to) == Ordering::Less);
        above_from && below_to
    }

    /// `true` if `key` may serve as an endpoint of a narrower window:
    /// `from <= key <= to`.
    fn admits_endpoint(&self, strategy: &BinarySearch<K>, key: &K) -> bool {
        let above_from = self
            .from
            .as_ref()
            .is_none_or(|from| strategy.compare(key, from) != Ordering::Less);
        let up_to_to = self
            .to
            .as_ref()
            .is_none_or(|to| strategy.compare(key, to) != Ordering::Greater);
        above_from && up_to_to
    }

    fn check(&self, strategy: &BinarySearch<K>, key: &K) -> Result<(), CollectionError> {
        if self.contains(strategy, key) {
            Ok(())
        } else {
            Err(CollectionError::OutOfRange)
        }
    }

    pub(crate) fn first<V>(&self, storage: &SortedStorage<K, V>) -> Result<K, CollectionError>
    where
        K: Clone,
    {
        let lower = self.lower_index(storage);
        if lower >= self.upper_index(storage) {
            return Err(CollectionError::EmptyCollection);
        }
        storage
            .key_at(lower)
            .cloned()
            .ok_or(CollectionError::EmptyCollection)
    }

    pub(crate) fn last<V>(&self, storage: &SortedStorage<K, V>) -> Result<K, CollectionError>
    where
        K: Clone,
    {
        let upper = self.upper_index(storage);
        if upper <= self.lower_index(storage) {
            return Err(CollectionError::EmptyCollection);
        }
        storage
            .key_at(upper - 1)
            .cloned()
            .ok_or(CollectionError::EmptyCollection)
    }
}

impl<K: Clone> Bounds<K> {
    /// Narrows these bounds. `None` inherits the current bound on that side.
    ///
    /// New endpoints must lie within the current window (the exclusive
    /// upper bound itself is an admissible endpoint) and `from <= to`.
    pub(crate) fn narrow(
        &self,
        strategy: &BinarySearch<K>,
        from: Option<K>,
        to: Option<K>,
    ) -> Result<Self, CollectionError> {
        let endpoints_admitted = from
            .iter()
            .chain(to.iter())
            .all(|endpoint| self.admits_endpoint(strategy, endpoint));
        if !endpoints_admitted {
            return Err(CollectionError::InvalidRange);
        }
        if let (Some(from), Some(to)) = (&from, &to)
            && strategy.compare(from, to) == Ordering::Greater
        {
            return Err(CollectionError::InvalidRange);
        }
        Ok(Self {
            from: from.or_else(|| self.from.clone()),
            to: to.or_else(|| self.to.clone()),
        })
    }
}

/// Lazy iterator over a window of a sorted storage.
///
/// The start position is resolved when the iterator is created; afterwards
/// each step reads the entry at the cursor and stops at the first key that
/// does not compare strictly below `to`.
pub struct RangeIter<K, V, R> {
    storage: SharedStorage<K, V, BinarySearch<K>>,
    position: usize,
    to: Option<K>,
    project: fn(&K, &V) -> R,
    finished: bool,
}

impl<K, V, R> Iterator for RangeIter<K, V, R> {
    type Item = R;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let storage = self.storage.borrow();
        let item = match (storage.key_at(self.position), storage.value_at(self.position)) {
            (Some(key), Some(value)) => {
                let below_to = self.to.as_ref().is_none_or(|to| {
                    storage.strategy().compare(key, to) == Ordering::Less
                });
                below_to.then(|| (self.project)(key, value))
            }
            _ => None,
        };
        match item {
            Some(_) => self.position += 1,
            None => self.finished = true,
        }
        item
    }
}

fn range_iter<K: Clone, V, R>(
    storage: &SharedStorage<K, V, BinarySearch<K>>,
    bounds: &Bounds<K>,
    project: fn(&K, &V) -> R,
) -> RangeIter<K, V, R> {
    let position = bounds.lower_index(&storage.borrow());
    RangeIter {
        storage: Rc::clone(storage),
        position,
        to: bounds.to.clone(),
        project,
        finished: false,
    }
}

/// Live window over a [`SortedArrayBackedSet`](super::SortedArrayBackedSet).
///
/// # Examples
///
/// ```rust
/// use livearray::array::SortedArrayBackedSet;
/// use livearray::CollectionError;
///
/// let mut set: SortedArrayBackedSet<i32> = [5, 3, 1, 4].into_iter().collect();
/// let window = set.sub_set(2, 5).unwrap();
/// assert_eq!(window.iter().collect::<Vec<_>>(), vec![3, 4]);
///
/// set.insert(2);
/// assert_eq!(window.first(), Ok(2));
///
/// assert_eq!(window.insert(9), Err(CollectionError::OutOfRange));
/// assert!(!set.contains(&9));
/// ```
pub struct SortedSetRange<T> {
    storage: SharedStorage<T, (), BinarySearch<T>>,
    bounds: Bounds<T>,
}

impl<T: Clone> SortedSetRange<T> {
    pub(crate) const fn new(
        storage: SharedStorage<T, (), BinarySearch<T>>,
        bounds: Bounds<T>,
    ) -> Self {
        Self { storage, bounds }
    }

    /// Number of backing elements currently inside the window.
    pub fn len(&self) -> usize {
        self.bounds.len(&self.storage.borrow())
    }

    /// Returns `true` if no backing element is inside the window.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `element` is inside the window and present.
    pub fn contains(&self, element: &T) -> bool {
        let storage = self.storage.borrow();
        self.bounds.contains(storage.strategy(), element)
            && storage.index_of_key(element).is_some()
    }

    /// Smallest element inside the window.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the window is empty.
    pub fn first(&self) -> Result<T, CollectionError> {
        self.bounds.first(&self.storage.borrow())
    }

    /// Largest element inside the window.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the window is empty.
    pub fn last(&self) -> Result<T, CollectionError> {
        self.bounds.last(&self.storage.borrow())
    }

    /// Adds `element` to the backing set, returning whether it was new.
    ///
    /// # Errors
    ///
    /// [`CollectionError::OutOfRange`] if `element` lies outside the window;
    /// the backing set is not touched.
    pub fn insert(&self, element: T) -> Result<bool, CollectionError> {
        let mut storage = self.storage.borrow_mut();
        self.bounds.check(storage.strategy(), &element)?;
        Ok(storage.upsert(element, ()).is_none())
    }

    /// Removes `element` from the backing set, returning whether it was present.
    ///
    /// # Errors
    ///
    /// [`CollectionError::OutOfRange`] if `element` lies outside the window.
    pub fn remove(&self, element: &T) -> Result<bool, CollectionError> {
        let mut storage = self.storage.borrow_mut();
        self.bounds.check(storage.strategy(), element)?;
        Ok(storage.remove_key(element).is_some())
    }

    /// Narrower window `[from, to)` over the same storage.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the bounds are reversed or leave
    /// this window.
    pub fn sub_set(&self, from: T, to: T) -> Result<Self, CollectionError> {
        self.narrow(Some(from), Some(to))
    }

    /// Narrower window below `to`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if `to` leaves this window.
    pub fn head_set(&self, to: T) -> Result<Self, CollectionError> {
        self.narrow(None, Some(to))
    }

    /// Narrower window from `from`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if `from` leaves this window.
    pub fn tail_set(&self, from: T) -> Result<Self, CollectionError> {
        self.narrow(Some(from), None)
    }

    fn narrow(&self, from: Option<T>, to: Option<T>) -> Result<Self, CollectionError> {
        let bounds = self
            .bounds
            .narrow(self.storage.borrow().strategy(), from, to)?;
        Ok(Self::new(Rc::clone(&self.storage), bounds))
    }

    /// Lazy iterator over the window in ascending order.
    pub fn iter(&self) -> RangeIter<T, (), T> {
        range_iter(&self.storage, &self.bounds, |element: &T, _: &()| {
            element.clone()
        })
    }
}

impl<T: Clone> Clone for SortedSetRange<T> {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.storage), self.bounds.clone())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for SortedSetRange<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

/// Live window over the keys of a
/// [`SortedArrayBackedMap`](super::SortedArrayBackedMap).
pub struct SortedMapRange<K, V> {
    storage: SharedStorage<K, V, BinarySearch<K>>,
    bounds: Bounds<K>,
}

impl<K: Clone, V> SortedMapRange<K, V> {
    pub(crate) const fn new(
        storage: SharedStorage<K, V, BinarySearch<K>>,
        bounds: Bounds<K>,
    ) -> Self {
        Self { storage, bounds }
    }

    /// Number of backing entries currently inside the window.
    pub fn len(&self) -> usize {
        self.bounds.len(&self.storage.borrow())
    }

    /// Returns `true` if no backing entry is inside the window.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is inside the window and mapped.
    pub fn contains_key(&self, key: &K) -> bool {
        let storage = self.storage.borrow();
        self.bounds.contains(storage.strategy(), key) && storage.index_of_key(key).is_some()
    }

    /// Value for `key`; `None` when absent or outside the window.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let storage = self.storage.borrow();
        if !self.bounds.contains(storage.strategy(), key) {
            return None;
        }
        let index = storage.index_of_key(key)?;
        storage.value_at(index).cloned()
    }

    /// Smallest key inside the window.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the window is empty.
    pub fn first_key(&self) -> Result<K, CollectionError> {
        self.bounds.first(&self.storage.borrow())
    }

    /// Largest key inside the window.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the window is empty.
    pub fn last_key(&self) -> Result<K, CollectionError> {
        self.bounds.last(&self.storage.borrow())
    }

    /// Inserts into the backing map, returning the replaced value.
    ///
    /// # Errors
    ///
    /// [`CollectionError::OutOfRange`] if `key` lies outside the window.
    pub fn insert(&self, key: K, value: V) -> Result<Option<V>, CollectionError> {
        let mut storage = self.storage.borrow_mut();
        self.bounds.check(storage.strategy(), &key)?;
        Ok(storage.upsert(key, value))
    }

    /// Removes from the backing map, returning the removed value.
    ///
    /// # Errors
    ///
    /// [`CollectionError::OutOfRange`] if `key` lies outside the window.
    pub fn remove(&self, key: &K) -> Result<Option<V>, CollectionError> {
        let mut storage = self.storage.borrow_mut();
        self.bounds.check(storage.strategy(), key)?;
        Ok(storage.remove_key(key).map(|(_, value)| value))
    }

    /// Narrower window `[from, to)`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the bounds are reversed or leave
    /// this window.
    pub fn sub_map(&self, from: K, to: K) -> Result<Self, CollectionError> {
        self.narrow(Some(from), Some(to))
    }

    /// Narrower window below `to`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if `to` leaves this window.
    pub fn head_map(&self, to: K) -> Result<Self, CollectionError> {
        self.narrow(None, Some(to))
    }

    /// Narrower window from `from`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if `from` leaves this window.
    pub fn tail_map(&self, from: K) -> Result<Self, CollectionError> {
        self.narrow(Some(from), None)
    }

    fn narrow(&self, from: Option<K>, to: Option<K>) -> Result<Self, CollectionError> {
        let bounds = self
            .bounds
            .narrow(self.storage.borrow().strategy(), from, to)?;
        Ok(Self::new(Rc::clone(&self.storage), bounds))
    }

    /// Lazy iterator over the window's keys.
    pub fn keys(&self) -> RangeIter<K, V, K> {
        range_iter(&self.storage, &self.bounds, |key: &K, _: &V| key.clone())
    }

    /// Lazy iterator over the window's entries in key order.
    pub fn iter(&self) -> RangeIter<K, V, (K, V)>
    where
        V: Clone,
    {
        range_iter(&self.storage, &self.bounds, |key: &K, value: &V| {
            (key.clone(), value.clone())
        })
    }
}

impl<K: Clone, V> Clone for SortedMapRange<K, V> {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.storage), self.bounds.clone())
    }
}

impl<K: Clone + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug for SortedMapRange<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}
