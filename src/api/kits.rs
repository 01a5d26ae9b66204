//! Kit (bill of materials) endpoints.
//!
//! Content rows carry optimistic-lock versions; a stale edit surfaces as
//! `ApiError::Conflict`, and the caller refetches rather than merging.

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::{ApiClient, ApiRequest};
use crate::errors::ApiError;
use crate::model::{Kit, KitContent};

#[derive(Debug, Clone, Serialize)]
pub struct CreateKitRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub build_target: u32,
}

/// Metadata edit (name/description/build target), version-checked.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateKitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_target: Option<u32>,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddKitContentRequest {
    pub part_id: Uuid,
    pub per_unit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateKitContentRequest {
    pub per_unit: u32,
    pub version: i64,
}

impl ApiClient {
    pub async fn list_kits(&self) -> Result<Vec<Kit>, ApiError> {
        self.request(ApiRequest::new("GET", "/api/kits")).await
    }

    pub async fn get_kit(&self, id: Uuid) -> Result<Kit, ApiError> {
        self.request(ApiRequest::new("GET", format!("/api/kits/{}", id)))
            .await
    }

    pub async fn create_kit(&self, req: &CreateKitRequest) -> Result<Kit, ApiError> {
        self.request(ApiRequest::json("POST", "/api/kits", json!(req)))
            .await
    }

    pub async fn update_kit(&self, id: Uuid, req: &UpdateKitRequest) -> Result<Kit, ApiError> {
        self.request(ApiRequest::json(
            "PATCH",
            format!("/api/kits/{}", id),
            json!(req),
        ))
        .await
    }

    pub async fn delete_kit(&self, id: Uuid) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new("DELETE", format!("/api/kits/{}", id)))
            .await
    }

    pub async fn add_kit_content(
        &self,
        kit_id: Uuid,
        req: &AddKitContentRequest,
    ) -> Result<KitContent, ApiError> {
        self.request(ApiRequest::json(
            "POST",
            format!("/api/kits/{}/contents", kit_id),
            json!(req),
        ))
        .await
    }

    pub async fn update_kit_content(
        &self,
        kit_id: Uuid,
        content_id: Uuid,
        req: &UpdateKitContentRequest,
    ) -> Result<KitContent, ApiError> {
        self.request(ApiRequest::json(
            "PATCH",
            format!("/api/kits/{}/contents/{}", kit_id, content_id),
            json!(req),
        ))
        .await
    }

    pub async fn remove_kit_content(
        &self,
        kit_id: Uuid,
        content_id: Uuid,
    ) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new(
            "DELETE",
            format!("/api/kits/{}/contents/{}", kit_id, content_id),
        ))
        .await
    }
}
