//! Array-backed sets.
//!
//! [`ArraySet`] stores its elements as the keys of an [`ArrayStorage`] with
//! `()` values. As with the maps, the variant is chosen by the index
//! strategy:
//!
//! - [`ArrayBackedSet`]: [`LinearScan`], iteration in insertion order.
//! - [`SortedArrayBackedSet`]: [`BinarySearch`], iteration in comparator
//!   order, with [`first`](ArraySet::first), [`last`](ArraySet::last) and
//!   live range views.
//!
//! # Examples
//!
//! ```rust
//! use livearray::array::SortedArrayBackedSet;
//!
//! let mut set = SortedArrayBackedSet::new();
//! for element in [5, 3, 1, 4] {
//!     set.insert(element);
//! }
//! assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3, 4, 5]);
//! assert_eq!(set.sub_set(2, 5).unwrap().len(), 2);
//! ```

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::Capabilities;
use super::index::{BinarySearch, Comparator, IndexStrategy, LinearScan};
use super::range::{Bounds, SortedSetRange};
use super::storage::{ArrayStorage, LiveIter, SharedStorage};
use crate::CollectionError;

/// Set over an array of unique elements.
///
/// Not thread-safe; see [`ArrayMap`](super::ArrayMap).
pub struct ArraySet<T, S> {
    storage: SharedStorage<T, (), S>,
}

/// Insertion-ordered set located by linear scan.
pub type ArrayBackedSet<T> = ArraySet<T, LinearScan>;

/// Ordered set located by binary search.
pub type SortedArrayBackedSet<T> = ArraySet<T, BinarySearch<T>>;

impl<T, S: IndexStrategy<T> + Default> ArraySet<T, S> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::from_storage(ArrayStorage::with_strategy(S::default()))
    }

    /// Creates an empty set able to hold `capacity` elements without growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_storage(ArrayStorage::with_capacity_and_strategy(
            capacity,
            S::default(),
        ))
    }
}

impl<T, S: IndexStrategy<T>> ArraySet<T, S> {
    fn from_storage(storage: ArrayStorage<T, (), S>) -> Self {
        Self {
            storage: Rc::new(RefCell::new(storage)),
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.borrow().len()
    }

    /// Returns `true` if the set holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.borrow().is_empty()
    }

    /// Returns `true` if `element` is present.
    pub fn contains(&self, element: &T) -> bool {
        self.storage.borrow().index_of_key(element).is_some()
    }

    /// Adds `element`, returning `true` if it was not already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::array::ArrayBackedSet;
    ///
    /// let mut set = ArrayBackedSet::new();
    /// assert!(set.insert("a"));
    /// assert!(!set.insert("a"));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, element: T) -> bool {
        self.storage.borrow_mut().upsert(element, ()).is_none()
    }

    /// Removes `element`, returning `true` if it was present.
    pub fn remove(&mut self, element: &T) -> bool {
        self.storage.borrow_mut().remove_key(element).is_some()
    }

    /// Removes every element. Outstanding range views become empty.
    pub fn clear(&mut self) {
        self.storage.borrow_mut().clear();
    }

    /// Live iterator in storage order.
    pub fn iter(&self) -> LiveIter<T, (), S, T>
    where
        T: Clone,
    {
        LiveIter::new(Rc::clone(&self.storage), 0, |element: &T, _: &()| {
            element.clone()
        })
    }

    #[cfg(test)]
    pub(crate) const fn storage_for_tests(&self) -> &SharedStorage<T, (), S> {
        &self.storage
    }
}

impl<T> ArraySet<T, BinarySearch<T>> {
    /// Creates an empty set ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::array::SortedArrayBackedSet;
    ///
    /// let mut set = SortedArrayBackedSet::with_comparator(|left: &String, right: &String| {
    ///     left.to_lowercase().cmp(&right.to_lowercase())
    /// });
    /// set.insert("b".to_string());
    /// set.insert("A".to_string());
    /// assert!(!set.insert("a".to_string()));
    /// assert_eq!(set.first(), Ok("A".to_string()));
    /// ```
    pub fn with_comparator<F>(comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        Self::from_storage(ArrayStorage::with_strategy(BinarySearch::with_comparator(
            Comparator::custom(comparator),
        )))
    }

    /// The ordering of this set.
    pub fn comparator(&self) -> Comparator<T> {
        self.storage.borrow().strategy().comparator().clone()
    }
}

impl<T: Clone> ArraySet<T, BinarySearch<T>> {
    /// Smallest element.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the set is empty.
    pub fn first(&self) -> Result<T, CollectionError> {
        Bounds::unbounded().first(&self.storage.borrow())
    }

    /// Largest element.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the set is empty.
    pub fn last(&self) -> Result<T, CollectionError> {
        Bounds::unbounded().last(&self.storage.borrow())
    }

    /// Live view of elements in `[from, to)`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if `from` orders after `to`.
    pub fn sub_set(&self, from: T, to: T) -> Result<SortedSetRange<T>, CollectionError> {
        self.range(Some(from), Some(to))
    }

    /// Live view of elements strictly below `to`.
    ///
    /// # Errors
    ///
    /// Never fails at the root; the `Result` matches the view composition API.
    pub fn head_set(&self, to: T) -> Result<SortedSetRange<T>, CollectionError> {
        self.range(None, Some(to))
    }

    /// Live view of elements at or above `from`.
    ///
    /// # Errors
    ///
    /// Never fails at the root; the `Result` matches the view composition API.
    pub fn tail_set(&self, from: T) -> Result<SortedSetRange<T>, CollectionError> {
        self.range(Some(from), None)
    }

    fn range(&self, from: Option<T>, to: Option<T>) -> Result<SortedSetRange<T>, CollectionError> {
        let bounds = {
            let storage = self.storage.borrow();
            Bounds::unbounded().narrow(storage.strategy(), from, to)?
        };
        Ok(SortedSetRange::new(Rc::clone(&self.storage), bounds))
    }
}

impl<T, S: IndexStrategy<T> + Default> Default for ArraySet<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy with independent storage.
impl<T: Clone, S: Clone> Clone for ArraySet<T, S> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::new(RefCell::new(self.storage.borrow().clone())),
        }
    }
}

/// Sets are equal when they hold the same elements, in any order.
impl<T, S: IndexStrategy<T>> PartialEq for ArraySet<T, S> {
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
                .all(|element| right.index_of_key(element).is_some())
    }
}

impl<T, S: IndexStrategy<T>> Eq for ArraySet<T, S> {}

impl<T: fmt::Debug, S> fmt::Debug for ArraySet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_set()
            .entries(self.storage.borrow().keys())
            .finish()
    }
}

impl<T, S: IndexStrategy<T> + Default> FromIterator<T> for ArraySet<T, S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, S: IndexStrategy<T>> Extend<T> for ArraySet<T, S> {
    /// The source is drained before the storage is borrowed, so it may be
    /// a live view of this same set.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let incoming: Vec<T> = iter.into_iter().collect();
        let mut storage = self.storage.borrow_mut();
        for element in incoming {
            storage.upsert(element, ());
        }
    }
}

impl<T, S> Capabilities for ArraySet<T, S> {
    const ALLOWS_NULL_KEYS: bool = true;
    const ALLOWS_NULL_VALUES: bool = true;
}
