//! Point-in-time copies of a multimap, and the serialized form.
//!
//! A [`MultimapSnapshot`] owns its data outright: restoring one with
//! [`ConcurrentMultimap::from_snapshot`] builds fresh value sets, so views of
//! the restored multimap never alias views of the original.
//!
//! With the `serde` feature, both the snapshot and [`ConcurrentMultimap`]
//! serialize as a map from key to a sequence of values:
//!
//! ```text
//! {"a": [1, 2], "b": [3]}
//! ```

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::ConcurrentMultimap;

/// Owned copy of the non-empty key/value-set mapping of a multimap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultimapSnapshot<K: Eq + Hash, V: Eq + Hash> {
    entries: HashMap<K, HashSet<V>>,
}

impl<K: Eq + Hash, V: Eq + Hash> MultimapSnapshot<K, V> {
    /// Key to value-set mapping. Every set is non-empty.
    pub const fn entries(&self) -> &HashMap<K, HashSet<V>> {
        &self.entries
    }

    /// Takes the mapping out of the snapshot.
    pub fn into_entries(self) -> HashMap<K, HashSet<V>> {
        self.entries
    }

    /// Total number of `(key, value)` associations.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashSet::len).sum()
    }

    /// Returns `true` if the snapshot holds no association.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

/// Keys mapped to empty sets are dropped.
impl<K: Eq + Hash, V: Eq + Hash> From<HashMap<K, HashSet<V>>> for MultimapSnapshot<K, V> {
    fn from(mut entries: HashMap<K, HashSet<V>>) -> Self {
        entries.retain(|_, values| !values.is_empty());
        Self { entries }
    }
}

impl<K: Eq + Hash, V: Eq + Hash> From<MultimapSnapshot<K, V>> for ConcurrentMultimap<K, V> {
    fn from(snapshot: MultimapSnapshot<K, V>) -> Self {
        Self::from_snapshot(snapshot)
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for MultimapSnapshot<K, V>
where
    K: serde::Serialize + Eq + Hash,
    V: serde::Serialize + Eq + Hash,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct MultimapSnapshotVisitor<K, V> {
    key_marker: std::marker::PhantomData<K>,
    value_marker: std::marker::PhantomData<V>,
}

#[cfg(feature = "serde")]
impl<K, V> MultimapSnapshotVisitor<K, V> {
    const fn new() -> Self {
        Self {
            key_marker: std::marker::PhantomData,
            value_marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for MultimapSnapshotVisitor<K, V>
where
    K: serde::Deserialize<'de> + Eq + Hash,
    V: serde::Deserialize<'de> + Eq + Hash,
{
    type Value = MultimapSnapshot<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map from keys to sequences of values")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut entries: HashMap<K, HashSet<V>> =
            HashMap::with_capacity(access.size_hint().unwrap_or(0));
        // A key repeated in the input merges into one value set.
        while let Some((key, values)) = access.next_entry::<K, Vec<V>>()? {
            entries.entry(key).or_default().extend(values);
        }
        Ok(MultimapSnapshot::from(entries))
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for MultimapSnapshot<K, V>
where
    K: serde::Deserialize<'de> + Eq + Hash,
    V: serde::Deserialize<'de> + Eq + Hash,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(MultimapSnapshotVisitor::new())
    }
}

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for ConcurrentMultimap<K, V>
where
    K: serde::Serialize + Eq + Hash + Clone,
    V: serde::Serialize + Eq + Hash + Clone,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.snapshot(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for ConcurrentMultimap<K, V>
where
    K: serde::Deserialize<'de> + Eq + Hash,
    V: serde::Deserialize<'de> + Eq + Hash,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <MultimapSnapshot<K, V> as serde::Deserialize>::deserialize(deserializer)
            .map(Self::from_snapshot)
    }
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_serialize_empty() {
        let multimap: ConcurrentMultimap<String, i32> = ConcurrentMultimap::new();
        let json = serde_json::to_string(&multimap).unwrap();
        assert_eq!(json, "{}");
    }

    #[rstest]
    fn test_serialize_single_value() {
        let multimap = ConcurrentMultimap::new();
        multimap.put("key".to_string(), 42);
        let json = serde_json::to_string(&multimap).unwrap();
        assert_eq!(json, r#"{"key":[42]}"#);
    }

    #[rstest]
    fn test_deserialize_merges_repeated_keys() {
        let snapshot: MultimapSnapshot<String, i32> =
            serde_json::from_str(r#"{"a":[1,2],"a":[2,3]}"#).unwrap();
        assert_eq!(snapshot.entries()["a"], HashSet::from([1, 2, 3]));
    }

    #[rstest]
    fn test_deserialize_drops_empty_sequences() {
        let multimap: ConcurrentMultimap<String, i32> =
            serde_json::from_str(r#"{"a":[],"b":[7]}"#).unwrap();
        assert_eq!(multimap.key_count(), 1);
        assert!(multimap.contains_entry(&"b".to_string(), &7));
    }

    #[rstest]
    fn test_round_trip_preserves_equality() {
        let original: ConcurrentMultimap<String, i32> = [
            ("a".to_string(), 1),
            ("a".to_string(), 2),
            ("b".to_string(), 3),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&original).unwrap();
        let restored: ConcurrentMultimap<String, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
        assert!(!original.get("a".to_string()).shares_storage_with(&restored.get("a".to_string())));
    }

    #[rstest]
    fn test_deserialize_rejects_non_map() {
        let result: Result<ConcurrentMultimap<String, i32>, _> = serde_json::from_str("[1,2]");
        assert!(result.is_err());
    }
}
