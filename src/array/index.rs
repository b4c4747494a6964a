//! Index strategies for locating keys in array-backed storage.
//!
//! An [`IndexStrategy`] answers two questions about a slice of keys:
//! where a key currently lives, and where an absent key should be inserted.
//!
//! - [`LinearScan`]: equality-based O(n) scan. New keys are appended, so
//!   iteration order is insertion order.
//! - [`BinarySearch`]: O(log n) search under a [`Comparator`]. Keys are kept
//!   strictly ordered and duplicates are impossible.
//!
//! # Examples
//!
//! ```rust
//! use livearray::array::{BinarySearch, IndexStrategy, LinearScan};
//!
//! let unsorted = [3, 1, 2];
//! assert_eq!(LinearScan.index_of(&unsorted, &1), Some(1));
//! assert_eq!(LinearScan.insertion_index(&unsorted, &9), Ok(3));
//!
//! let sorted = [1, 3, 5];
//! let strategy = BinarySearch::natural();
//! assert_eq!(strategy.index_of(&sorted, &5), Some(2));
//! assert_eq!(strategy.insertion_index(&sorted, &4), Ok(2));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::CollectionError;

/// Ordering used by sorted collections.
///
/// `Natural` is only constructible through [`Comparator::natural`], which
/// requires `T: Ord`; it stores the type's own `Ord::cmp`. `Custom` holds
/// a caller-supplied total order.
pub enum Comparator<T> {
    /// The element type's `Ord` implementation.
    Natural(fn(&T, &T) -> Ordering),
    /// A caller-supplied total order.
    Custom(Rc<dyn Fn(&T, &T) -> Ordering>),
}

impl<T: Ord> Comparator<T> {
    /// Returns the natural ordering of `T`.
    #[inline]
    #[must_use]
    pub fn natural() -> Self {
        Self::Natural(T::cmp)
    }
}

impl<T> Comparator<T> {
    /// Wraps a custom total order.
    ///
    /// The function must be a total order consistent with equality of the
    /// stored elements; the sorted collections rely on it for uniqueness.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use livearray::array::Comparator;
    /// use std::cmp::Ordering;
    ///
    /// let reversed = Comparator::custom(|left: &i32, right: &i32| right.cmp(left));
    /// assert_eq!(reversed.compare(&1, &2), Ordering::Greater);
    /// ```
    pub fn custom<F>(comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        Self::Custom(Rc::new(comparator))
    }

    /// Compares two elements.
    #[inline]
    pub fn compare(&self, left: &T, right: &T) -> Ordering {
        match self {
            Self::Natural(compare) => compare(left, right),
            Self::Custom(compare) => compare(left, right),
        }
    }

    /// Returns `true` for the natural ordering.
    #[inline]
    #[must_use]
    pub const fn is_natural(&self) -> bool {
        matches!(self, Self::Natural(_))
    }
}

impl<T> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Natural(compare) => Self::Natural(*compare),
            Self::Custom(compare) => Self::Custom(Rc::clone(compare)),
        }
    }
}

impl<T> fmt::Debug for Comparator<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Natural(_) => formatter.write_str("Comparator::Natural"),
            Self::Custom(_) => formatter.write_str("Comparator::Custom"),
        }
    }
}

impl<T: Ord> Default for Comparator<T> {
    fn default() -> Self {
        Self::natural()
    }
}

/// Locates keys inside the key array of an `ArrayStorage`.
pub trait IndexStrategy<K> {
    /// Returns the position of `key`, or `None` if absent.
    fn index_of(&self, keys: &[K], key: &K) -> Option<usize>;

    /// Returns the position at which an absent `key` must be inserted.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::ContractViolation`] if the strategy finds
    /// `key` already present. Callers must check absence first.
    fn insertion_index(&self, keys: &[K], key: &K) -> Result<usize, CollectionError>;
}

/// Equality-based linear scan. Appends new keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearScan;

impl<K: PartialEq> IndexStrategy<K> for LinearScan {
    #[inline]
    fn index_of(&self, keys: &[K], key: &K) -> Option<usize> {
        keys.iter().position(|candidate| candidate == key)
    }

    #[inline]
    fn insertion_index(&self, keys: &[K], _key: &K) -> Result<usize, CollectionError> {
        Ok(keys.len())
    }
}

/// Binary search over keys kept strictly ordered by a [`Comparator`].
#[derive(Debug, Clone)]
pub struct BinarySearch<K> {
    comparator: Comparator<K>,
}

impl<K: Ord> BinarySearch<K> {
    /// Binary search under the natural ordering of `K`.
    #[must_use]
    pub fn natural() -> Self {
        Self {
            comparator: Comparator::natural(),
        }
    }
}

impl<K: Ord> Default for BinarySearch<K> {
    fn default() -> Self {
        Self::natural()
    }
}

impl<K> BinarySearch<K> {
    /// Binary search under the given comparator.
    #[must_use]
    pub const fn with_comparator(comparator: Comparator<K>) -> Self {
        Self { comparator }
    }

    /// Returns the comparator in use.
    #[inline]
    pub const fn comparator(&self) -> &Comparator<K> {
        &self.comparator
    }

    /// Compares two keys with the configured comparator.
    #[inline]
    pub fn compare(&self, left: &K, right: &K) -> Ordering {
        self.comparator.compare(left, right)
    }

    /// `Ok(index)` if found, `Err(insertion_point)` otherwise.
    #[inline]
    pub fn search(&self, keys: &[K], key: &K) -> Result<usize, usize> {
        keys.binary_search_by(|candidate| self.comparator.compare(candidate, key))
    }

    /// Index of the first key that is not less than `key`.
    ///
    /// Equal to the found index when `key` is present, which is what makes
    /// lower bounds inclusive and upper bounds exclusive in range views.
    #[inline]
    pub fn insertion_point(&self, keys: &[K], key: &K) -> usize {
        match self.search(keys, key) {
            Ok(index) | Err(index) => index,
        }
    }
}

impl<K> IndexStrategy<K> for BinarySearch<K> {
    #[inline]
    fn index_of(&self, keys: &[K], key: &K) -> Option<usize> {
        self.search(keys, key).ok()
    }

    #[inline]
    fn insertion_index(&self, keys: &[K], key: &K) -> Result<usize, CollectionError> {
        match self.search(keys, key) {
            Ok(index) => Err(CollectionError::ContractViolation { index }),
            Err(index) => Ok(index),
        }
    }
}
