//! Deterministic sort orders for shopping-list lines.
//!
//! String comparisons are case-insensitive with a case-sensitive tiebreak,
//! and every comparator ends on the line id so the order is total: sorting
//! twice yields the same result.

use std::cmp::Ordering;

use super::line::ConceptLine;

/// Available sort orders for a line list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSortKey {
    /// Part description, case-insensitive ascending.
    Description,
    /// Manufacturer code, case-insensitive ascending; lines without one last.
    Mpn,
    /// Newest first.
    CreatedAt,
}

/// Case-insensitive comparison with a case-sensitive tiebreak.
fn compare_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Compare two lines under the given sort key.
pub fn compare_lines(a: &ConceptLine, b: &ConceptLine, key: LineSortKey) -> Ordering {
    let primary = match key {
        LineSortKey::Description => compare_ci(&a.part_description, &b.part_description),
        LineSortKey::Mpn => match (&a.manufacturer_code, &b.manufacturer_code) {
            (Some(ma), Some(mb)) => compare_ci(ma, mb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_ci(&a.part_description, &b.part_description),
        },
        // Descending: newest first
        LineSortKey::CreatedAt => b.created_at.cmp(&a.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Sort a line list in place under the given key.
pub fn sort_lines(lines: &mut [ConceptLine], key: LineSortKey) {
    lines.sort_by(|a, b| compare_lines(a, b, key));
}
