use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A kit (bill of materials) with a build target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kit {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// How many assemblies the kit should cover.
    pub build_target: u32,
    #[serde(default)]
    pub contents: Vec<KitContent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// One part row in a kit's bill of materials.
///
/// `shortfall` is computed server-side against current stock and the kit's
/// build target; the client never recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitContent {
    pub id: Uuid,
    pub kit_id: Uuid,
    pub part_id: Uuid,
    pub part_description: String,
    /// Quantity needed per assembly.
    pub per_unit: u32,
    #[serde(default)]
    pub shortfall: i64,
    pub version: i64,
}
