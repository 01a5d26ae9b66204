//! Part CRUD endpoints.

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::{ApiClient, ApiRequest};
use crate::errors::ApiError;
use crate::model::Part;

#[derive(Debug, Clone, Serialize)]
pub struct CreatePartRequest {
    pub description: String,
    pub manufacturer_code: Option<String>,
    pub manufacturer: Option<String>,
    pub seller_id: Option<Uuid>,
    pub seller_link: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update; `None` fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePartRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_link: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Version the edit was based on; the server rejects stale writes with 409.
    pub version: i64,
}

impl ApiClient {
    pub async fn list_parts(&self) -> Result<Vec<Part>, ApiError> {
        self.request(ApiRequest::new("GET", "/api/parts")).await
    }

    pub async fn get_part(&self, id: Uuid) -> Result<Part, ApiError> {
        self.request(ApiRequest::new("GET", format!("/api/parts/{}", id)))
            .await
    }

    pub async fn create_part(&self, req: &CreatePartRequest) -> Result<Part, ApiError> {
        self.request(ApiRequest::json("POST", "/api/parts", json!(req)))
            .await
    }

    pub async fn update_part(&self, id: Uuid, req: &UpdatePartRequest) -> Result<Part, ApiError> {
        self.request(ApiRequest::json(
            "PATCH",
            format!("/api/parts/{}", id),
            json!(req),
        ))
        .await
    }

    pub async fn delete_part(&self, id: Uuid) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new("DELETE", format!("/api/parts/{}", id)))
            .await
    }
}
