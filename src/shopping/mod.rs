//! View-model layer for shopping lists.
//!
//! Pure mapping from the wire schemas in `crate::model` to the shapes the UI
//! renders: per-line derived flags, seller-group aggregation for the Ready
//! view, and list-level rollups. Everything here is total over well-formed
//! input, never mutates its inputs, and is deterministic — the same line
//! list always maps to the same detail.

pub mod detail;
pub mod group;
pub mod line;
pub mod sort;

pub use detail::{LineCounts, ListDetail};
pub use group::{GroupTotals, SellerGroup};
pub use line::ConceptLine;
pub use sort::{LineSortKey, compare_lines, sort_lines};
