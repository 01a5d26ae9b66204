//! Storage-box CRUD endpoints.

use serde::Serialize;
use serde_json::json;

use super::{ApiClient, ApiRequest};
use crate::errors::ApiError;
use crate::model::{BoxDetail, BoxSummary};

#[derive(Debug, Clone, Serialize)]
pub struct CreateBoxRequest {
    pub description: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateBoxRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl ApiClient {
    pub async fn list_boxes(&self) -> Result<Vec<BoxSummary>, ApiError> {
        self.request(ApiRequest::new("GET", "/api/boxes")).await
    }

    pub async fn get_box(&self, box_no: u32) -> Result<BoxDetail, ApiError> {
        self.request(ApiRequest::new("GET", format!("/api/boxes/{}", box_no)))
            .await
    }

    pub async fn create_box(&self, req: &CreateBoxRequest) -> Result<BoxSummary, ApiError> {
        self.request(ApiRequest::json("POST", "/api/boxes", json!(req)))
            .await
    }

    pub async fn update_box(
        &self,
        box_no: u32,
        req: &UpdateBoxRequest,
    ) -> Result<BoxSummary, ApiError> {
        self.request(ApiRequest::json(
            "PATCH",
            format!("/api/boxes/{}", box_no),
            json!(req),
        ))
        .await
    }

    pub async fn delete_box(&self, box_no: u32) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new("DELETE", format!("/api/boxes/{}", box_no)))
            .await
    }
}
