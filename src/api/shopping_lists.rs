//! Shopping-list endpoints: CRUD plus the line-action endpoints that drive
//! the order → receive → complete flow.

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::{ApiClient, ApiRequest};
use crate::errors::ApiError;
use crate::model::{ListStatus, ShoppingList, ShoppingListLine};

#[derive(Debug, Clone, Serialize)]
pub struct CreateShoppingListRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateShoppingListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddLineRequest {
    pub part_id: Uuid,
    pub needed: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateLineRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
    pub version: i64,
}

/// One (box, location, quantity) allocation accompanying a receive action.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiveAllocation {
    pub box_no: u32,
    pub loc_no: u32,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiveLineRequest {
    /// Quantity received in this action ("Receive now").
    pub quantity: i64,
    /// Where the received units were stored. Quantities must sum to
    /// `quantity`; validated client-side by `crate::allocation`.
    pub allocations: Vec<ReceiveAllocation>,
}

impl ApiClient {
    pub async fn list_shopping_lists(&self) -> Result<Vec<ShoppingList>, ApiError> {
        self.request(ApiRequest::new("GET", "/api/shopping-lists"))
            .await
    }

    pub async fn get_shopping_list(&self, id: Uuid) -> Result<ShoppingList, ApiError> {
        self.request(ApiRequest::new("GET", format!("/api/shopping-lists/{}", id)))
            .await
    }

    pub async fn create_shopping_list(
        &self,
        req: &CreateShoppingListRequest,
    ) -> Result<ShoppingList, ApiError> {
        self.request(ApiRequest::json("POST", "/api/shopping-lists", json!(req)))
            .await
    }

    pub async fn update_shopping_list(
        &self,
        id: Uuid,
        req: &UpdateShoppingListRequest,
    ) -> Result<ShoppingList, ApiError> {
        self.request(ApiRequest::json(
            "PATCH",
            format!("/api/shopping-lists/{}", id),
            json!(req),
        ))
        .await
    }

    pub async fn delete_shopping_list(&self, id: Uuid) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new(
            "DELETE",
            format!("/api/shopping-lists/{}", id),
        ))
        .await
    }

    /// Move a list between concept/ready/done. The server rejects illegal
    /// moves (e.g. ready → concept while lines are on order).
    pub async fn set_shopping_list_status(
        &self,
        id: Uuid,
        status: ListStatus,
    ) -> Result<ShoppingList, ApiError> {
        self.request(ApiRequest::json(
            "POST",
            format!("/api/shopping-lists/{}/status", id),
            json!({ "status": status }),
        ))
        .await
    }

    /// Replace the free-text order note for one seller group.
    pub async fn put_order_note(
        &self,
        id: Uuid,
        seller_id: Option<Uuid>,
        note: &str,
    ) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::json(
            "PUT",
            format!("/api/shopping-lists/{}/order-notes", id),
            json!({ "seller_id": seller_id, "note": note }),
        ))
        .await
    }

    pub async fn add_line(
        &self,
        list_id: Uuid,
        req: &AddLineRequest,
    ) -> Result<ShoppingListLine, ApiError> {
        self.request(ApiRequest::json(
            "POST",
            format!("/api/shopping-lists/{}/lines", list_id),
            json!(req),
        ))
        .await
    }

    pub async fn update_line(
        &self,
        list_id: Uuid,
        line_id: Uuid,
        req: &UpdateLineRequest,
    ) -> Result<ShoppingListLine, ApiError> {
        self.request(ApiRequest::json(
            "PATCH",
            format!("/api/shopping-lists/{}/lines/{}", list_id, line_id),
            json!(req),
        ))
        .await
    }

    pub async fn delete_line(&self, list_id: Uuid, line_id: Uuid) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new(
            "DELETE",
            format!("/api/shopping-lists/{}/lines/{}", list_id, line_id),
        ))
        .await
    }

    /// Mark a line ordered (new → ordered) with the quantity put on order.
    pub async fn order_line(
        &self,
        list_id: Uuid,
        line_id: Uuid,
        ordered: i64,
    ) -> Result<ShoppingListLine, ApiError> {
        self.request(ApiRequest::json(
            "POST",
            format!("/api/shopping-lists/{}/lines/{}/order", list_id, line_id),
            json!({ "ordered": ordered }),
        ))
        .await
    }

    /// Revert an ordered line back to new. Only legal while nothing has
    /// been received against it.
    pub async fn revert_line(
        &self,
        list_id: Uuid,
        line_id: Uuid,
    ) -> Result<ShoppingListLine, ApiError> {
        self.request(ApiRequest::new(
            "POST",
            format!("/api/shopping-lists/{}/lines/{}/revert", list_id, line_id),
        ))
        .await
    }

    /// Record received stock against an ordered line.
    pub async fn receive_line(
        &self,
        list_id: Uuid,
        line_id: Uuid,
        req: &ReceiveLineRequest,
    ) -> Result<ShoppingListLine, ApiError> {
        self.request(ApiRequest::json(
            "POST",
            format!("/api/shopping-lists/{}/lines/{}/receive", list_id, line_id),
            json!(req),
        ))
        .await
    }

    /// Close out a line (ordered → done). The server records a quantity
    /// mismatch when received differs from ordered at completion.
    pub async fn complete_line(
        &self,
        list_id: Uuid,
        line_id: Uuid,
    ) -> Result<ShoppingListLine, ApiError> {
        self.request(ApiRequest::new(
            "POST",
            format!("/api/shopping-lists/{}/lines/{}/complete", list_id, line_id),
        ))
        .await
    }
}
