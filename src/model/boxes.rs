use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A storage box as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSummary {
    /// Boxes are addressed by number, not id, throughout the UI.
    pub box_no: u32,
    pub description: String,
    /// Number of addressable locations in the box.
    pub capacity: u32,
    /// Locations currently holding at least one part.
    pub occupied: u32,
}

impl BoxSummary {
    /// Fraction of locations in use, in `[0.0, 1.0]`.
    pub fn usage(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(self.occupied) / f64::from(self.capacity)
    }
}

/// A single location within a box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxLocation {
    /// 1-based location number within the box.
    pub loc_no: u32,
    pub part_id: Option<Uuid>,
    pub part_description: Option<String>,
    #[serde(default)]
    pub quantity: i64,
}

/// A storage box with its full location map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxDetail {
    pub box_no: u32,
    pub description: String,
    pub capacity: u32,
    pub locations: Vec<BoxLocation>,
}
