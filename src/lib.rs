//! # livearray
//!
//! Array-backed ordered collections with live views, and a thread-safe
//! multimap with live per-key value sets.
//!
//! ## Overview
//!
//! - **Array collections** ([`array`]): maps and sets stored in parallel
//!   growable arrays. The linear variants keep insertion order; the sorted
//!   variants use binary search under a comparator and offer `first`, `last`
//!   and live range views (`sub_set`, `head_set`, `tail_set`, ...).
//! - **Concurrent multimap** ([`multimap`]): maps keys to sets of values,
//!   safe to share across threads, handing out views that track later
//!   writes to their key.
//!
//! Views in both families never copy: they observe every later change of
//! the collection they came from.
//!
//! ## Feature Flags
//!
//! - `array`: array-backed maps, sets and range views (default)
//! - `multimap`: concurrent multimap (default)
//! - `serde`: serialization of the multimap and its snapshots
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use livearray::prelude::*;
//!
//! let mut set: SortedArrayBackedSet<i32> = [5, 3, 1, 4].into_iter().collect();
//! let window = set.sub_set(2, 5).unwrap();
//! assert_eq!(window.len(), 2);
//! set.insert(2);
//! assert_eq!(window.len(), 3);
//!
//! let multimap = ConcurrentMultimap::new();
//! let view = multimap.get("a");
//! multimap.put("a", 1);
//! assert!(view.contains(&1));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use livearray::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Capabilities;
    pub use crate::CollectionError;

    #[cfg(feature = "array")]
    pub use crate::array::*;

    #[cfg(feature = "multimap")]
    pub use crate::multimap::*;
}

mod capabilities;
mod error;

pub use capabilities::Capabilities;
pub use error::CollectionError;

#[cfg(feature = "array")]
pub mod array;

#[cfg(feature = "multimap")]
pub mod multimap;
