//! Hash map construction with a shared hasher
//!
//! Lookup tables built per document (resource ids, marker id groups) use
//! ahash for consistent performance across platforms with `DoS` resistance.

use ahash::RandomState;
use std::collections::{HashMap, HashSet};

/// Create a new `HashMap` with the crate's hasher
///
/// # Example
///
/// ```rust
/// use markers_core::utils::hashers::create_hash_map;
///
/// let mut formats = create_hash_map::<String, u32>();
/// formats.insert("r1".to_string(), 25);
/// ```
#[must_use]
pub fn create_hash_map<K, V>() -> HashMap<K, V, RandomState> {
    HashMap::with_hasher(RandomState::new())
}

/// Create a new `HashMap` with specific capacity
///
/// Pre-allocates when the number of entries is known up front, e.g. one
/// group per resolved marker.
#[must_use]
pub fn create_hash_map_with_capacity<K, V>(capacity: usize) -> HashMap<K, V, RandomState> {
    HashMap::with_capacity_and_hasher(capacity, RandomState::new())
}

/// Create a new `HashSet` with the crate's hasher
#[must_use]
pub fn create_hash_set<T>() -> HashSet<T, RandomState> {
    HashSet::with_hasher(RandomState::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_and_sets_behave_like_std() {
        let mut map = create_hash_map_with_capacity::<&str, usize>(4);
        *map.entry("X").or_default() += 1;
        *map.entry("X").or_default() += 1;
        assert_eq!(map.get("X"), Some(&2));

        let mut set = create_hash_set();
        assert!(set.insert("Dialogue"));
        assert!(!set.insert("Dialogue"));
    }
}
