//! Typed REST client for the inventory backend.
//!
//! `ApiClient` is a thin, typed wrapper over the backend's JSON endpoints.
//! All calls go through the [`Transport`] trait so tests (and the optimistic
//! mutation layer's tests) can substitute an in-memory backend for
//! `reqwest`.
//!
//! Per-resource method groups live in the submodules; this module holds the
//! transport plumbing and response decoding shared by all of them.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::ApiError;

pub mod boxes;
pub mod documents;
pub mod kits;
pub mod parts;
pub mod sellers;
pub mod shopping_lists;

/// Body of an outgoing request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Raw upload (document content).
    Bytes {
        content_type: String,
        data: Vec<u8>,
    },
}

/// An outgoing request, independent of the underlying HTTP library.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: &'static str,
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: &'static str, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn json(method: &'static str, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }
}

/// A raw response: status plus body bytes.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Executes requests against the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, req: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// `reqwest`-backed transport used in production.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.config.url_for(&req.path);
        let method = reqwest::Method::from_bytes(req.method.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid method {}: {}", req.method, e))?;

        let mut builder = self
            .client
            .request(method, &url)
            .timeout(self.config.request_timeout);
        builder = match req.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Bytes { content_type, data } => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(data),
        };

        let resp = builder.send().await.map_err(|source| ApiError::Transport {
            path: req.path.clone(),
            source,
        })?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                path: req.path.clone(),
                source,
            })?
            .to_vec();
        Ok(ApiResponse { status, body })
    }
}

/// Typed client over the backend's REST API.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Client talking HTTP to a real backend.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(HttpTransport::new(config)),
        }
    }

    /// Client over a custom transport (tests, in-memory backends).
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute a request and decode the JSON response body.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        req: ApiRequest,
    ) -> Result<T, ApiError> {
        let (method, path) = (req.method, req.path.clone());
        debug!(method, %path, "api request");
        let resp = self.transport.execute(req).await?;
        check_status(method, &path, &resp)?;
        serde_json::from_slice(&resp.body).map_err(|source| ApiError::Decode { path, source })
    }

    /// Execute a request, expecting no meaningful response body.
    pub(crate) async fn request_empty(&self, req: ApiRequest) -> Result<(), ApiError> {
        let (method, path) = (req.method, req.path.clone());
        debug!(method, %path, "api request");
        let resp = self.transport.execute(req).await?;
        check_status(method, &path, &resp)
    }
}

/// Map non-success statuses to errors, pulling the backend's `{"error": ...}`
/// message through when present.
fn check_status(method: &'static str, path: &str, resp: &ApiResponse) -> Result<(), ApiError> {
    match resp.status {
        200..=299 => Ok(()),
        409 => Err(ApiError::Conflict {
            method,
            path: path.to_string(),
        }),
        status => {
            let message = serde_json::from_slice::<Value>(&resp.body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| String::from_utf8_lossy(&resp.body).into_owned());
            Err(ApiError::Http {
                status,
                method,
                path: path.to_string(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_status_accepts_2xx() {
        let resp = ApiResponse {
            status: 204,
            body: vec![],
        };
        assert!(check_status("DELETE", "/api/parts/x", &resp).is_ok());
    }

    #[test]
    fn check_status_maps_409_to_conflict() {
        let resp = ApiResponse {
            status: 409,
            body: b"{\"error\":\"stale version\"}".to_vec(),
        };
        let err = check_status("PATCH", "/api/kits/k", &resp).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn check_status_extracts_error_message() {
        let resp = ApiResponse {
            status: 400,
            body: b"{\"error\":\"needed must be positive\"}".to_vec(),
        };
        match check_status("POST", "/api/shopping-lists", &resp).unwrap_err() {
            ApiError::Http { status, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(message, "needed must be positive");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn check_status_falls_back_to_raw_body() {
        let resp = ApiResponse {
            status: 500,
            body: b"internal".to_vec(),
        };
        match check_status("GET", "/api/boxes", &resp).unwrap_err() {
            ApiError::Http { message, .. } => assert_eq!(message, "internal"),
            other => panic!("Expected Http error, got {:?}", other),
        }
    }
}
