//! Static description of what a collection accepts.

/// Which absent (`None`) keys and values a collection accepts.
///
/// Rust has no null. A collection whose key or value type is an `Option<_>`
/// either stores `None` like any other element or does not; the constants
/// report which, so generic code can check without probing.
///
/// # Examples
///
/// ```rust
/// use livearray::Capabilities;
/// use livearray::array::SortedArrayBackedMap;
///
/// assert!(SortedArrayBackedMap::<Option<i32>, i32>::ALLOWS_NULL_KEYS);
/// ```
pub trait Capabilities {
    /// `true` if `None` keys (or set elements) are stored like any other.
    const ALLOWS_NULL_KEYS: bool;
    /// `true` if `None` values are stored like any other.
    const ALLOWS_NULL_VALUES: bool;
}
