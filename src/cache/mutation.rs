use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

use super::store::{QueryCache, QueryKey};
use crate::errors::{ApiError, CacheError};

/// A batch of cache writes collected by a patch closure.
///
/// Patches only see (and may only write) the keys the mutation declared;
/// rollback is scoped to those keys, so an undeclared write could never be
/// undone.
pub struct CachePatch {
    declared: Vec<QueryKey>,
    current: HashMap<QueryKey, Value>,
    writes: Vec<(QueryKey, Option<Value>)>,
}

impl CachePatch {
    fn capture(cache: &QueryCache, declared: &[QueryKey]) -> Self {
        let mut current = HashMap::new();
        for key in declared {
            if let Some(value) = cache.get_raw(key) {
                current.insert(*key, value);
            }
        }
        Self {
            declared: declared.to_vec(),
            current,
            writes: Vec::new(),
        }
    }

    /// Current (pre-patch) typed value of a declared key.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>, CacheError> {
        match self.current.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(
                |source| CacheError::Decode {
                    key: key.to_string(),
                    source,
                },
            ),
        }
    }

    pub fn set<T: Serialize>(&mut self, key: QueryKey, value: &T) {
        let value = serde_json::to_value(value).expect("serializable cache value");
        self.writes.push((key, Some(value)));
    }

    pub fn remove(&mut self, key: QueryKey) {
        self.writes.push((key, None));
    }

    fn apply(self, cache: &QueryCache) {
        for (key, value) in self.writes {
            if !self.declared.contains(&key) {
                warn!(%key, "patch write to undeclared key dropped");
                continue;
            }
            match value {
                Some(v) => cache.set_raw(key, v),
                None => cache.remove(&key),
            }
        }
    }
}

/// Runs mutations with optimistic cache updates.
///
/// Protocol per mutation:
/// 1. lock the declared keys (sorted, so concurrent mutations can't deadlock)
/// 2. snapshot their exact current entries
/// 3. apply the optimistic patch
/// 4. await the network request
/// 5. on success, merge the authoritative response over the patch;
///    on failure, restore the snapshot byte-for-byte
/// 6. either way, mark the declared keys stale so a background refetch
///    reconciles anything the patch could not anticipate
///
/// A version conflict (HTTP 409) is handled as a failure: restore and force
/// a refetch, never merge conflicting state.
#[derive(Clone)]
pub struct MutationController {
    cache: QueryCache,
}

impl MutationController {
    pub fn new(cache: QueryCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn run<T, P, M, Fut>(
        &self,
        touched: &[QueryKey],
        optimistic: P,
        request: Fut,
        merge: M,
    ) -> Result<T, ApiError>
    where
        P: FnOnce(&mut CachePatch),
        M: FnOnce(&T, &mut CachePatch),
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut keys = touched.to_vec();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            guards.push(self.cache.lock_key(*key).await);
        }

        let snapshot = self.cache.snapshot(&keys);

        let mut patch = CachePatch::capture(&self.cache, &keys);
        optimistic(&mut patch);
        patch.apply(&self.cache);

        let outcome = request.await;

        match &outcome {
            Ok(value) => {
                let mut patch = CachePatch::capture(&self.cache, &keys);
                merge(value, &mut patch);
                patch.apply(&self.cache);
                debug!(keys = keys.len(), "mutation settled, merged response");
            }
            Err(err) => {
                self.cache.restore(&snapshot);
                if err.is_conflict() {
                    debug!("mutation hit version conflict, forcing refetch");
                } else {
                    debug!(%err, "mutation failed, rolled back");
                }
            }
        }

        // Invalidate-on-settle, success or failure
        self.cache.invalidate(&keys);
        drop(guards);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn controller() -> MutationController {
        MutationController::new(QueryCache::new())
    }

    #[tokio::test]
    async fn success_merges_authoritative_response() {
        let ctl = controller();
        let key = QueryKey::KitDetail(Uuid::new_v4());
        ctl.cache().set_raw(key, json!({"name": "old", "version": 1}));

        let result: Result<Value, ApiError> = ctl
            .run(
                &[key],
                |patch| patch.set(key, &json!({"name": "optimistic", "version": 1})),
                async { Ok(json!({"name": "new", "version": 2})) },
                |resp, patch| patch.set(key, resp),
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(
            ctl.cache().get_raw(&key),
            Some(json!({"name": "new", "version": 2}))
        );
        // Settled mutations always leave their keys marked for refetch
        assert!(ctl.cache().is_stale(&key));
    }

    #[tokio::test]
    async fn failure_restores_exact_snapshot() {
        let ctl = controller();
        let key = QueryKey::ShoppingListDetail(Uuid::new_v4());
        let original = json!({"lines": [1, 2, 3], "version": 7});
        ctl.cache().set_raw(key, original.clone());

        let result: Result<Value, ApiError> = ctl
            .run(
                &[key],
                |patch| patch.set(key, &json!({"lines": [], "version": 7})),
                async {
                    Err(ApiError::Http {
                        status: 500,
                        method: "POST",
                        path: "/x".into(),
                        message: "boom".into(),
                    })
                },
                |resp, patch| patch.set(key, resp),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(ctl.cache().get_raw(&key), Some(original));
        assert!(ctl.cache().is_stale(&key));
    }

    #[tokio::test]
    async fn failure_removes_optimistically_created_entries() {
        let ctl = controller();
        let key = QueryKey::Part(Uuid::new_v4());
        // Key absent before the mutation

        let result: Result<Value, ApiError> = ctl
            .run(
                &[key],
                |patch| patch.set(key, &json!({"description": "phantom"})),
                async {
                    Err(ApiError::Transport {
                        path: "/api/parts".into(),
                        source: reqwest_error().await,
                    })
                },
                |resp, patch| patch.set(key, resp),
            )
            .await;

        assert!(result.is_err());
        // Round-trip identity: the key is absent again
        assert_eq!(ctl.cache().get_raw(&key), None);
    }

    #[tokio::test]
    async fn conflict_rolls_back_and_flags_refetch() {
        let ctl = controller();
        let key = QueryKey::KitDetail(Uuid::new_v4());
        let original = json!({"version": 3});
        ctl.cache().set_raw(key, original.clone());
        let rx = ctl.cache().subscribe_refetch();
        let before = *rx.borrow();

        let result: Result<Value, ApiError> = ctl
            .run(
                &[key],
                |patch| patch.set(key, &json!({"version": 3, "name": "edited"})),
                async {
                    Err(ApiError::Conflict {
                        method: "PATCH",
                        path: "/api/kits/x".into(),
                    })
                },
                |resp, patch| patch.set(key, resp),
            )
            .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(ctl.cache().get_raw(&key), Some(original));
        assert!(ctl.cache().is_stale(&key));
        assert!(*rx.borrow() > before);
    }

    #[tokio::test]
    async fn optimistic_patch_is_visible_before_settle() {
        let ctl = controller();
        let key = QueryKey::SellerList;
        ctl.cache().set_raw(key, json!(["a"]));

        let cache = ctl.cache().clone();
        let result: Result<Value, ApiError> = ctl
            .run(
                &[key],
                |patch| patch.set(key, &json!(["a", "b"])),
                async move {
                    // Mid-flight, readers see the optimistic value
                    assert_eq!(cache.get_raw(&key), Some(json!(["a", "b"])));
                    Ok(json!(["a", "b"]))
                },
                |resp, patch| patch.set(key, resp),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn writes_to_undeclared_keys_are_dropped() {
        let ctl = controller();
        let declared = QueryKey::PartList;
        let undeclared = QueryKey::BoxList;

        let result: Result<Value, ApiError> = ctl
            .run(
                &[declared],
                |patch| {
                    patch.set(declared, &json!([1]));
                    patch.set(undeclared, &json!(["sneaky"]));
                },
                async { Ok(json!([1])) },
                |_, _| {},
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(ctl.cache().get_raw(&undeclared), None);
    }

    // Building a real reqwest::Error without a network requires a failed
    // connect to a port nothing listens on.
    async fn reqwest_error() -> reqwest::Error {
        reqwest::Client::new()
            .get("http://127.0.0.1:1/unreachable")
            .send()
            .await
            .unwrap_err()
    }
}
