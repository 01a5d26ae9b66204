//! Typed error hierarchy for the benchstock client.
//!
//! Three top-level enums cover the three subsystems:
//! - `ApiError` — REST transport and decoding failures
//! - `CacheError` — query-cache bookkeeping failures
//! - `BridgeError` — SSE event-bridge failures

use thiserror::Error;

/// Errors from the REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status} for {method} {path}: {message}")]
    Http {
        status: u16,
        method: &'static str,
        path: String,
        message: String,
    },

    /// Optimistic-lock conflict (HTTP 409). Callers refetch and re-sync
    /// rather than merging.
    #[error("Version conflict for {method} {path}")]
    Conflict { method: &'static str, path: String },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }
}

/// Errors from the keyed query cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Snapshot does not cover key {key}")]
    SnapshotMissingKey { key: String },

    #[error("Cached value under {key} failed to decode: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the SSE event bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Event bridge is shut down")]
    Closed,

    #[error("Failed to open event stream at {url}: {source}")]
    ConnectFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_matchable() {
        let err = ApiError::Conflict {
            method: "PATCH",
            path: "/api/kits/1/contents/2".into(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }

    #[test]
    fn http_404_is_not_found() {
        let err = ApiError::Http {
            status: 404,
            method: "GET",
            path: "/api/parts/x".into(),
            message: "no such part".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn cache_error_carries_key() {
        let err = CacheError::SnapshotMissingKey {
            key: "part_list".into(),
        };
        assert!(err.to_string().contains("part_list"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ApiError::Conflict {
            method: "PUT",
            path: "/x".into(),
        });
        assert_std_error(&CacheError::SnapshotMissingKey { key: "k".into() });
        assert_std_error(&BridgeError::Closed);
    }
}
