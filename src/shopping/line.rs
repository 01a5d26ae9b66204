use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{LineStatus, SellerRef, ShoppingListLine};

/// One demand line as the UI sees it: the wire fields plus derived flags.
///
/// The flags encode the line state machine (new → ordered → done, revert
/// ordered → new) so rendering code never consults `status` directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptLine {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub part_id: Uuid,
    pub part_description: String,
    pub manufacturer_code: Option<String>,
    pub effective_seller: Option<SellerRef>,
    pub needed: i64,
    pub ordered: i64,
    pub received: i64,
    pub status: LineStatus,
    pub note: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub version: i64,
    /// Stock can be received against the line (it is on order).
    pub can_receive: bool,
    /// The line can be placed on order.
    pub is_orderable: bool,
    /// The line can be sent back to new (ordered, nothing received yet).
    pub is_revertible: bool,
    /// Completed with received differing from ordered.
    pub has_quantity_mismatch: bool,
}

impl ConceptLine {
    /// Map a wire line to its view-model. Total over well-formed input.
    pub fn from_wire(line: &ShoppingListLine) -> Self {
        let status = line.status;
        Self {
            id: line.id,
            shopping_list_id: line.shopping_list_id,
            part_id: line.part_id,
            part_description: line.part_description.clone(),
            manufacturer_code: line.manufacturer_code.clone(),
            effective_seller: line.effective_seller.clone(),
            needed: line.needed,
            ordered: line.ordered,
            received: line.received,
            status,
            note: line.note.clone(),
            completed_at: line.completed_at,
            created_at: line.created_at,
            version: line.version,
            can_receive: status == LineStatus::Ordered,
            is_orderable: status == LineStatus::New && line.needed > 0,
            is_revertible: status == LineStatus::Ordered && line.received == 0,
            has_quantity_mismatch: status == LineStatus::Done && line.received != line.ordered,
        }
    }
}
