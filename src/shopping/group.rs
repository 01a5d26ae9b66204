//! Seller-group aggregation for the Ready view.
//!
//! Groups are derived, never persisted: they are recomputed from the line
//! list on every fetch. Every line lands in exactly one group — lines with
//! no effective seller fall into the trailing "Ungrouped" group — so group
//! totals always partition the line totals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::line::ConceptLine;
use super::sort::{LineSortKey, sort_lines};
use crate::model::{SellerOrderNote, SellerRef};

/// Display name used for lines without an effective seller.
pub const UNGROUPED_LABEL: &str = "Ungrouped";

/// Rolled-up quantities over one group's lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub needed: i64,
    pub ordered: i64,
    pub received: i64,
}

impl GroupTotals {
    fn add(&mut self, line: &ConceptLine) {
        self.needed += line.needed;
        self.ordered += line.ordered;
        self.received += line.received;
    }
}

/// Lines sharing an effective seller, with rolled-up totals and the group's
/// free-text order note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerGroup {
    /// `None` for the ungrouped bucket.
    pub seller: Option<SellerRef>,
    pub lines: Vec<ConceptLine>,
    pub totals: GroupTotals,
    pub order_note: Option<String>,
}

impl SellerGroup {
    pub fn display_name(&self) -> &str {
        self.seller
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or(UNGROUPED_LABEL)
    }
}

// Named sellers sort case-insensitively ascending; the ungrouped bucket
// always comes last.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Seller(String, String, Uuid),
    Ungrouped,
}

impl GroupKey {
    fn for_seller(seller: &Option<SellerRef>) -> Self {
        match seller {
            Some(s) => Self::Seller(s.name.to_lowercase(), s.name.clone(), s.id),
            None => Self::Ungrouped,
        }
    }
}

/// Partition lines by effective seller in canonical group order.
///
/// Lines within each group are sorted by description; order notes are
/// matched to groups by seller id (`None` addresses the ungrouped bucket).
pub fn group_by_seller(lines: &[ConceptLine], notes: &[SellerOrderNote]) -> Vec<SellerGroup> {
    let mut buckets: BTreeMap<GroupKey, SellerGroup> = BTreeMap::new();

    for line in lines {
        let key = GroupKey::for_seller(&line.effective_seller);
        let group = buckets.entry(key).or_insert_with(|| SellerGroup {
            seller: line.effective_seller.clone(),
            lines: Vec::new(),
            totals: GroupTotals::default(),
            order_note: None,
        });
        group.totals.add(line);
        group.lines.push(line.clone());
    }

    let mut groups: Vec<SellerGroup> = buckets.into_values().collect();
    for group in &mut groups {
        sort_lines(&mut group.lines, LineSortKey::Description);
        let seller_id = group.seller.as_ref().map(|s| s.id);
        group.order_note = notes
            .iter()
            .find(|n| n.seller_id == seller_id)
            .map(|n| n.note.clone());
    }
    groups
}
