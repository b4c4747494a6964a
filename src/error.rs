//! Error types shared by the collection modules.
//!
//! Lookups of absent keys are never errors in this crate: they return
//! `None` or `false`. [`CollectionError`] is reserved for operations that
//! cannot produce a meaningful answer (`first` on an empty window), for
//! mutations a view must refuse, and for internal contract breaches.

use std::fmt;

/// Errors raised by the array-backed collections and their views.
///
/// # Examples
///
/// ```rust
/// use livearray::array::SortedArrayBackedSet;
/// use livearray::CollectionError;
///
/// let set: SortedArrayBackedSet<i32> = SortedArrayBackedSet::new();
/// assert_eq!(set.first(), Err(CollectionError::EmptyCollection));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    /// `first`/`last` was requested from a collection or window with no elements.
    EmptyCollection,

    /// A range view was asked to insert or remove an element outside `[from, to)`.
    ///
    /// The backing collection is left unchanged.
    OutOfRange,

    /// Sub-range bounds are reversed or escape the parent view's bounds.
    InvalidRange,

    /// A binary search located an existing entry where the caller had
    /// already established that the key was absent.
    ///
    /// This is a programming error inside the crate, never a consequence
    /// of how the collections are used.
    ContractViolation {
        /// Position at which the supposedly absent key was found.
        index: usize,
    },
}

impl fmt::Display for CollectionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCollection => write!(formatter, "collection is empty"),
            Self::OutOfRange => write!(formatter, "element is outside the view's range"),
            Self::InvalidRange => {
                write!(
                    formatter,
                    "range bounds are reversed or outside the parent range"
                )
            }
            Self::ContractViolation { index } => {
                write!(
                    formatter,
                    "insertion point requested for a key already present at index {index}"
                )
            }
        }
    }
}

impl std::error::Error for CollectionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(CollectionError::EmptyCollection, "collection is empty")]
    #[case::out_of_range(CollectionError::OutOfRange, "element is outside the view's range")]
    #[case::invalid_range(
        CollectionError::InvalidRange,
        "range bounds are reversed or outside the parent range"
    )]
    #[case::contract(
        CollectionError::ContractViolation { index: 3 },
        "insertion point requested for a key already present at index 3"
    )]
    fn test_display(#[case] error: CollectionError, #[case] expected: &str) {
        assert_eq!(format!("{error}"), expected);
    }

    #[rstest]
    fn test_is_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(CollectionError::OutOfRange);
        assert!(error.source().is_none());
    }
}
