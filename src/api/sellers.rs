//! Seller CRUD endpoints.

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::{ApiClient, ApiRequest};
use crate::errors::ApiError;
use crate::model::Seller;

#[derive(Debug, Clone, Serialize)]
pub struct SellerRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ApiClient {
    pub async fn list_sellers(&self) -> Result<Vec<Seller>, ApiError> {
        self.request(ApiRequest::new("GET", "/api/sellers")).await
    }

    pub async fn get_seller(&self, id: Uuid) -> Result<Seller, ApiError> {
        self.request(ApiRequest::new("GET", format!("/api/sellers/{}", id)))
            .await
    }

    pub async fn create_seller(&self, req: &SellerRequest) -> Result<Seller, ApiError> {
        self.request(ApiRequest::json("POST", "/api/sellers", json!(req)))
            .await
    }

    pub async fn update_seller(&self, id: Uuid, req: &SellerRequest) -> Result<Seller, ApiError> {
        self.request(ApiRequest::json(
            "PUT",
            format!("/api/sellers/{}", id),
            json!(req),
        ))
        .await
    }

    pub async fn delete_seller(&self, id: Uuid) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new("DELETE", format!("/api/sellers/{}", id)))
            .await
    }
}
