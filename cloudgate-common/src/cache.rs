//! Shared collaborator cache
//!
//! Collaborator lookups (tenant resolution, subscription metadata and the
//! like) are the only state that outlives a single invocation. The cache is
//! keyed by `(group, key)` so a collaborator can drop everything it has
//! cached for one concern without touching the others.
//!
//! Concurrent readers and writers are safe; entries are plain JSON values so
//! the engine never needs to know the collaborator's result types.

use dashmap::DashMap;
use serde_json::Value;

/// Thread-safe, group-invalidating cache for collaborator lookups.
///
/// Entries never expire on their own; collaborators call
/// [`ResourceCache::invalidate_group`] when they know a concern went stale.
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: DashMap<(String, String), Value>,
}

impl ResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a cached value, if present
    pub fn get(&self, group: &str, key: &str) -> Option<Value> {
        self.entries
            .get(&(group.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Store a value, replacing any previous entry for the same key
    pub fn set(&self, group: &str, key: &str, value: Value) {
        self.entries
            .insert((group.to_string(), key.to_string()), value);
    }

    /// Drop every entry belonging to a group
    pub fn invalidate_group(&self, group: &str) {
        let before = self.entries.len();
        self.entries.retain(|(entry_group, _), _| entry_group != group);
        // Concurrent inserts during the retain can push len past `before`.
        let dropped = before.saturating_sub(self.entries.len());
        tracing::debug!(group, dropped, "cache group invalidated");
    }

    /// Number of live entries across all groups
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_round_trip() {
        let cache = ResourceCache::new();
        cache.set("tenant", "sub-1", json!({"tenant_id": "t-9"}));

        assert_eq!(cache.get("tenant", "sub-1"), Some(json!({"tenant_id": "t-9"})));
        assert_eq!(cache.get("tenant", "sub-2"), None);
    }

    #[test]
    fn test_set_replaces_existing_entry() {
        let cache = ResourceCache::new();
        cache.set("tenant", "sub-1", json!("old"));
        cache.set("tenant", "sub-1", json!("new"));

        assert_eq!(cache.get("tenant", "sub-1"), Some(json!("new")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_group_scoped() {
        let cache = ResourceCache::new();
        cache.set("tenant", "sub-1", json!("a"));
        cache.set("tenant", "sub-2", json!("b"));
        cache.set("subscription", "sub-1", json!("c"));

        cache.invalidate_group("tenant");

        assert_eq!(cache.get("tenant", "sub-1"), None);
        assert_eq!(cache.get("tenant", "sub-2"), None);
        assert_eq!(cache.get("subscription", "sub-1"), Some(json!("c")));
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;

        let cache = Arc::new(ResourceCache::new());
        let mut handles = Vec::new();

        for worker in 0..8 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    cache.set("group", &format!("{worker}-{i}"), json!(i));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8 * 50);
    }

    #[test]
    fn test_invalidation_races_concurrent_writers() {
        use std::sync::Arc;

        let cache = Arc::new(ResourceCache::new());
        let mut handles = Vec::new();

        for worker in 0..4 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..200 {
                    cache.set("keep", &format!("{worker}-{i}"), json!(i));
                    cache.set("drop", &format!("{worker}-{i}"), json!(i));
                }
            }));
        }
        let invalidator = {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    cache.invalidate_group("drop");
                }
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        invalidator.join().unwrap();

        cache.invalidate_group("drop");
        assert_eq!(cache.len(), 4 * 200);
        assert_eq!(cache.get("keep", "0-0"), Some(json!(0)));
        assert_eq!(cache.get("drop", "0-0"), None);
    }
}
