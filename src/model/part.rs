use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A part in the inventory.
///
/// `version` is the optimistic-lock counter the server bumps on every write;
/// stale updates come back as HTTP 409.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub id: Uuid,
    pub description: String,
    /// Manufacturer part number (MPN).
    pub manufacturer_code: Option<String>,
    pub manufacturer: Option<String>,
    /// Preferred seller for restocking, if any.
    pub seller_id: Option<Uuid>,
    /// Product page at the preferred seller.
    pub seller_link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Total quantity on hand across all box locations (server-computed).
    pub total_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}
