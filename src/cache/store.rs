use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, watch};
use tracing::debug;
use uuid::Uuid;

use crate::errors::CacheError;

/// Cache keys, one variant per query the UI issues.
///
/// Structured (not stringly-typed) so invalidation sites can't typo a key;
/// the `Display` form is for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    PartList,
    Part(Uuid),
    PartDocuments(Uuid),
    BoxList,
    BoxDetail(u32),
    KitList,
    KitDetail(Uuid),
    SellerList,
    ShoppingListIndex,
    ShoppingListDetail(Uuid),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartList => write!(f, "parts"),
            Self::Part(id) => write!(f, "parts/{}", id),
            Self::PartDocuments(id) => write!(f, "parts/{}/documents", id),
            Self::BoxList => write!(f, "boxes"),
            Self::BoxDetail(no) => write!(f, "boxes/{}", no),
            Self::KitList => write!(f, "kits"),
            Self::KitDetail(id) => write!(f, "kits/{}", id),
            Self::SellerList => write!(f, "sellers"),
            Self::ShoppingListIndex => write!(f, "shopping-lists"),
            Self::ShoppingListDetail(id) => write!(f, "shopping-lists/{}", id),
        }
    }
}

/// Exact copy of a set of cache entries, including which keys were absent.
///
/// Restoring a snapshot puts those keys back byte-for-byte — present entries
/// are rewritten, absent ones removed — which is what makes optimistic
/// rollback safe against partial-rollback corruption.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    entries: Vec<(QueryKey, Option<Value>)>,
}

impl CacheSnapshot {
    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// The captured value for a key, if the snapshot covers it.
    pub fn value_of(&self, key: &QueryKey) -> Result<&Option<Value>, CacheError> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| CacheError::SnapshotMissingKey {
                key: key.to_string(),
            })
    }
}

struct CacheInner {
    entries: HashMap<QueryKey, Value>,
    stale: HashSet<QueryKey>,
    generation: u64,
}

/// Async keyed store backing all query data.
///
/// Cheap to clone; clones share state. Values are stored as JSON so the
/// store stays type-agnostic while typed accessors do the (de)serialization
/// at the edges.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<RwLock<CacheInner>>,
    /// Per-key mutexes so concurrent mutations of one key serialize.
    key_locks: Arc<StdMutex<HashMap<QueryKey, Arc<AsyncMutex<()>>>>>,
    refetch_tx: Arc<watch::Sender<u64>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (refetch_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                entries: HashMap::new(),
                stale: HashSet::new(),
                generation: 0,
            })),
            key_locks: Arc::new(StdMutex::new(HashMap::new())),
            refetch_tx: Arc::new(refetch_tx),
        }
    }

    /// Raw cached value under a key.
    pub fn get_raw(&self, key: &QueryKey) -> Option<Value> {
        self.inner.read().expect("cache lock").entries.get(key).cloned()
    }

    /// Typed cached value under a key.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>, CacheError> {
        match self.get_raw(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| CacheError::Decode {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    pub fn set_raw(&self, key: QueryKey, value: Value) {
        let mut inner = self.inner.write().expect("cache lock");
        inner.entries.insert(key, value);
        inner.stale.remove(&key);
    }

    pub fn set<T: Serialize>(&self, key: QueryKey, value: &T) {
        let value = serde_json::to_value(value).expect("serializable cache value");
        self.set_raw(key, value);
    }

    pub fn remove(&self, key: &QueryKey) {
        let mut inner = self.inner.write().expect("cache lock");
        inner.entries.remove(key);
        inner.stale.remove(key);
    }

    /// Capture the exact current state of the given keys.
    pub fn snapshot(&self, keys: &[QueryKey]) -> CacheSnapshot {
        let inner = self.inner.read().expect("cache lock");
        CacheSnapshot {
            entries: keys
                .iter()
                .map(|key| (*key, inner.entries.get(key).cloned()))
                .collect(),
        }
    }

    /// Put every snapshotted key back exactly as captured.
    pub fn restore(&self, snapshot: &CacheSnapshot) {
        let mut inner = self.inner.write().expect("cache lock");
        for (key, value) in &snapshot.entries {
            debug!(%key, present = value.is_some(), "restoring cache entry");
            match value {
                Some(v) => {
                    inner.entries.insert(*key, v.clone());
                }
                None => {
                    inner.entries.remove(key);
                }
            }
        }
    }

    /// Mark keys stale and wake refetch observers.
    pub fn invalidate(&self, keys: &[QueryKey]) {
        let generation = {
            let mut inner = self.inner.write().expect("cache lock");
            for key in keys {
                debug!(%key, "invalidating");
                inner.stale.insert(*key);
            }
            inner.generation += 1;
            inner.generation
        };
        let _ = self.refetch_tx.send(generation);
    }

    /// Mark every cached key whose string form starts with `prefix` stale.
    /// Useful for family-wide invalidation, e.g. `"parts"` after a bulk edit.
    pub fn invalidate_prefix(&self, prefix: &str) {
        let keys: Vec<QueryKey> = {
            let inner = self.inner.read().expect("cache lock");
            inner
                .entries
                .keys()
                .filter(|key| key.to_string().starts_with(prefix))
                .copied()
                .collect()
        };
        if !keys.is_empty() {
            self.invalidate(&keys);
        }
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner.read().expect("cache lock").stale.contains(key)
    }

    /// Observer channel bumped on every invalidation; refetch loops watch it.
    pub fn subscribe_refetch(&self) -> watch::Receiver<u64> {
        self.refetch_tx.subscribe()
    }

    /// Acquire the per-key mutation lock. Guards for distinct keys are
    /// independent; callers locking several keys must do so in sorted order.
    pub async fn lock_key(&self, key: QueryKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.key_locks.lock().expect("key lock map");
            locks.entry(key).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_round_trip() {
        let cache = QueryCache::new();
        cache.set(QueryKey::PartList, &vec!["a", "b"]);
        let got: Option<Vec<String>> = cache.get(&QueryKey::PartList).unwrap();
        assert_eq!(got, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn get_missing_key_is_none() {
        let cache = QueryCache::new();
        let got: Option<Value> = cache.get(&QueryKey::BoxList).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn snapshot_restore_round_trips_exactly() {
        let cache = QueryCache::new();
        let id = Uuid::new_v4();
        cache.set_raw(QueryKey::Part(id), json!({"description": "LED"}));
        // BoxList deliberately absent

        let snapshot = cache.snapshot(&[QueryKey::Part(id), QueryKey::BoxList]);

        cache.set_raw(QueryKey::Part(id), json!({"description": "mangled"}));
        cache.set_raw(QueryKey::BoxList, json!([1, 2, 3]));

        cache.restore(&snapshot);
        assert_eq!(
            cache.get_raw(&QueryKey::Part(id)),
            Some(json!({"description": "LED"}))
        );
        // Absent key is removed again, not left behind
        assert_eq!(cache.get_raw(&QueryKey::BoxList), None);
    }

    #[test]
    fn invalidate_marks_stale_and_bumps_generation() {
        let cache = QueryCache::new();
        let rx = cache.subscribe_refetch();
        cache.set_raw(QueryKey::KitList, json!([]));
        assert!(!cache.is_stale(&QueryKey::KitList));

        cache.invalidate(&[QueryKey::KitList]);
        assert!(cache.is_stale(&QueryKey::KitList));
        assert_eq!(*rx.borrow(), 1);
    }

    #[test]
    fn invalidate_prefix_hits_the_whole_family() {
        let cache = QueryCache::new();
        let id = Uuid::new_v4();
        cache.set_raw(QueryKey::PartList, json!([]));
        cache.set_raw(QueryKey::Part(id), json!({}));
        cache.set_raw(QueryKey::BoxList, json!([]));

        cache.invalidate_prefix("parts");
        assert!(cache.is_stale(&QueryKey::PartList));
        assert!(cache.is_stale(&QueryKey::Part(id)));
        assert!(!cache.is_stale(&QueryKey::BoxList));
    }

    #[test]
    fn set_clears_staleness() {
        let cache = QueryCache::new();
        cache.invalidate(&[QueryKey::SellerList]);
        assert!(cache.is_stale(&QueryKey::SellerList));
        cache.set_raw(QueryKey::SellerList, json!([]));
        assert!(!cache.is_stale(&QueryKey::SellerList));
    }

    #[test]
    fn snapshot_value_of_unknown_key_errors() {
        let cache = QueryCache::new();
        let snapshot = cache.snapshot(&[QueryKey::PartList]);
        assert!(snapshot.value_of(&QueryKey::BoxList).is_err());
        assert!(snapshot.value_of(&QueryKey::PartList).is_ok());
    }

    #[tokio::test]
    async fn key_locks_serialize_writers_per_key() {
        let cache = QueryCache::new();
        let guard = cache.lock_key(QueryKey::PartList).await;

        // A second lock on the same key must wait
        let cache2 = cache.clone();
        let contended = tokio::spawn(async move {
            let _g = cache2.lock_key(QueryKey::PartList).await;
        });
        tokio::task::yield_now().await;
        assert!(!contended.is_finished());

        // A different key is independent
        let _other = cache.lock_key(QueryKey::BoxList).await;

        drop(guard);
        contended.await.unwrap();
    }
}
