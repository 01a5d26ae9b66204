use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::{SellerGroup, group_by_seller};
use super::line::ConceptLine;
use crate::model::{LineStatus, ListStatus, ShoppingList};

/// Per-status line tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounts {
    pub new: usize,
    pub ordered: usize,
    pub done: usize,
}

impl LineCounts {
    pub fn total(&self) -> usize {
        self.new + self.ordered + self.done
    }
}

/// List-level aggregate view: status, tallies, and seller groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDetail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ListStatus,
    pub line_counts: LineCounts,
    pub total_lines: usize,
    pub has_ordered_lines: bool,
    pub groups: Vec<SellerGroup>,
    /// True only when the list is ready and no line is on order.
    pub can_return_to_concept: bool,
    pub version: i64,
}

/// Map a wire shopping list to its detail view. Total and non-mutating;
/// groups are recomputed from the line list every time.
pub fn map_detail(list: &ShoppingList) -> ListDetail {
    let lines: Vec<ConceptLine> = list.lines.iter().map(ConceptLine::from_wire).collect();

    let mut line_counts = LineCounts::default();
    for line in &lines {
        match line.status {
            LineStatus::New => line_counts.new += 1,
            LineStatus::Ordered => line_counts.ordered += 1,
            LineStatus::Done => line_counts.done += 1,
        }
    }
    let has_ordered_lines = line_counts.ordered > 0;

    ListDetail {
        id: list.id,
        name: list.name.clone(),
        description: list.description.clone(),
        status: list.status,
        line_counts,
        total_lines: lines.len(),
        has_ordered_lines,
        groups: group_by_seller(&lines, &list.order_notes),
        can_return_to_concept: list.status == ListStatus::Ready && !has_ordered_lines,
        version: list.version,
    }
}
