//! Thread-safe multimap with live per-key value sets.
//!
//! [`ConcurrentMultimap`] maps each key to a set of values. The value set of
//! a key is a shared object: [`ConcurrentMultimap::get`] hands out a
//! [`ValueSetView`] over that very object, so values added or removed later,
//! from any thread, are visible through the view without fetching it again.
//!
//! # Locking
//!
//! ```text
//!   table: RwLock<HashMap<K, Arc<RwLock<HashSet<V>>>>>
//!            │ outer lock            │ one inner lock per key
//! ```
//!
//! Locks are always taken outer first, then inner.
//!
//! - Writes to an existing key hold the outer lock shared and that key's
//!   inner lock exclusively, so writes to different keys run in parallel.
//! - Creating a key and detaching a key ([`remove_all`], [`clear`]) hold the
//!   outer lock exclusively.
//!
//! Every structural operation is therefore atomic with respect to every
//! other operation on the same key, and no reader observes a half-applied
//! batch.
//!
//! # Detachment
//!
//! [`remove_all`] discards the key's value set. Views obtained earlier keep
//! the discarded (now empty) set and do not observe values put under the
//! key afterwards, which go into a fresh set:
//!
//! ```rust
//! use livearray::multimap::ConcurrentMultimap;
//!
//! let multimap = ConcurrentMultimap::new();
//! let before = multimap.get("a");
//! multimap.put("a", 1);
//! assert!(before.contains(&1));
//!
//! multimap.remove_all(&"a");
//! multimap.put("a", 9);
//! assert!(!before.contains(&9));
//! assert!(multimap.get("a").contains(&9));
//! ```
//!
//! Removing the last value with [`remove`] does not detach.
//!
//! [`remove_all`]: ConcurrentMultimap::remove_all
//! [`clear`]: ConcurrentMultimap::clear
//! [`remove`]: ConcurrentMultimap::remove

mod concurrent;
mod snapshot;
mod view;

pub use concurrent::ConcurrentMultimap;
pub use snapshot::MultimapSnapshot;
pub use view::MultimapKeySet;
pub use view::ValueSetView;

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One key's value set, shared between the table and its views.
pub(crate) type SharedValues<V> = Arc<RwLock<HashSet<V>>>;

/// The key table, shared between the multimap and its key-set views.
pub(crate) type SharedTable<K, V> = Arc<RwLock<HashMap<K, SharedValues<V>>>>;

static_assertions::assert_impl_all!(ConcurrentMultimap<String, i32>: Send, Sync);
static_assertions::assert_impl_all!(ValueSetView<String, i32>: Send, Sync, Clone);
static_assertions::assert_impl_all!(MultimapKeySet<String, i32>: Send, Sync, Clone);
