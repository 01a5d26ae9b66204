//! Validation for the stock-receive allocation form.
//!
//! When stock arrives against an ordered line, the received units are
//! allocated to (box, location) slots. The rules:
//!
//! - a fully blank row is removable filler, never an error;
//! - a non-blank row needs a box, a positive location, and a positive
//!   quantity;
//! - no two rows may target the same (box, location) pair;
//! - the quantities must sum to the "Receive now" amount exactly.
//!
//! Failures come back as a structured report — per-row field errors plus one
//! summary line — rather than an `Err`, so the form can render them inline.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::api::shopping_lists::ReceiveAllocation;

/// One editable allocation row. `None` fields are empty form inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub box_no: Option<u32>,
    pub location: Option<u32>,
    pub quantity: Option<i64>,
}

impl AllocationRow {
    /// A row with nothing filled in; skipped entirely by validation.
    pub fn is_blank(&self) -> bool {
        self.box_no.is_none() && self.location.is_none() && self.quantity.is_none()
    }
}

/// Field-scoped errors for one row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowErrors {
    pub box_no: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<String>,
}

impl RowErrors {
    pub fn is_clean(&self) -> bool {
        self.box_no.is_none() && self.location.is_none() && self.quantity.is_none()
    }
}

/// Outcome of validating a set of rows against a receive-now target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationReport {
    /// One entry per input row, blank rows included (with clean errors).
    pub row_errors: Vec<RowErrors>,
    /// Aggregate shortfall/excess message, if the sum is off.
    pub summary: Option<String>,
}

impl AllocationReport {
    pub fn is_valid(&self) -> bool {
        self.summary.is_none() && self.row_errors.iter().all(RowErrors::is_clean)
    }
}

/// Validate allocation rows against the receive-now quantity.
pub fn validate_allocations(rows: &[AllocationRow], receive_now: i64) -> AllocationReport {
    let mut row_errors: Vec<RowErrors> = vec![RowErrors::default(); rows.len()];
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut allocated: i64 = 0;

    for (idx, row) in rows.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        let errors = &mut row_errors[idx];

        match row.box_no {
            Some(_) => {}
            None => errors.box_no = Some("Select a box".into()),
        }
        match row.location {
            Some(loc) if loc > 0 => {}
            Some(_) => errors.location = Some("Location must be a positive number".into()),
            None => errors.location = Some("Enter a location".into()),
        }
        match row.quantity {
            Some(qty) if qty > 0 => allocated += qty,
            Some(_) => errors.quantity = Some("Quantity must be a positive number".into()),
            None => errors.quantity = Some("Enter a quantity".into()),
        }

        // Duplicate slots flag every occurrence after the first
        if let (Some(box_no), Some(loc)) = (row.box_no, row.location)
            && loc > 0
            && !seen.insert((box_no, loc))
        {
            errors.location = Some(format!("Box {} location {} is already used", box_no, loc));
        }
    }

    let summary = match allocated - receive_now {
        0 => None,
        diff if diff < 0 => Some(format!("Allocate {} more to match Receive now", -diff)),
        diff => Some(format!("Remove {} to match Receive now", diff)),
    };

    AllocationReport {
        row_errors,
        summary,
    }
}

/// Convert validated rows into the wire payload, dropping blank rows.
///
/// Call only after `validate_allocations(...).is_valid()`; incomplete rows
/// are skipped rather than guessed at.
pub fn to_wire(rows: &[AllocationRow]) -> Vec<ReceiveAllocation> {
    rows.iter()
        .filter_map(|row| match (row.box_no, row.location, row.quantity) {
            (Some(box_no), Some(loc_no), Some(quantity)) => Some(ReceiveAllocation {
                box_no,
                loc_no,
                quantity,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(box_no: u32, location: u32, quantity: i64) -> AllocationRow {
        AllocationRow {
            box_no: Some(box_no),
            location: Some(location),
            quantity: Some(quantity),
        }
    }

    #[test]
    fn exact_sum_with_complete_rows_is_valid() {
        let rows = vec![row(1, 5, 6), row(2, 1, 4)];
        let report = validate_allocations(&rows, 10);
        assert!(report.is_valid());
        assert!(report.summary.is_none());
    }

    #[test]
    fn blank_rows_are_ignored() {
        let rows = vec![row(1, 5, 10), AllocationRow::default()];
        let report = validate_allocations(&rows, 10);
        assert!(report.is_valid());
        assert!(report.row_errors[1].is_clean());
    }

    #[test]
    fn partial_row_gets_field_errors() {
        let rows = vec![AllocationRow {
            box_no: None,
            location: Some(3),
            quantity: Some(5),
        }];
        let report = validate_allocations(&rows, 5);
        assert!(!report.is_valid());
        assert!(report.row_errors[0].box_no.is_some());
        assert!(report.row_errors[0].location.is_none());
        assert!(report.row_errors[0].quantity.is_none());
    }

    #[test]
    fn zero_and_negative_values_are_rejected() {
        let rows = vec![row(1, 0, 0)];
        let report = validate_allocations(&rows, 5);
        assert!(report.row_errors[0].location.is_some());
        assert!(report.row_errors[0].quantity.is_some());
    }

    #[test]
    fn duplicate_slots_flag_later_rows() {
        let rows = vec![row(1, 5, 3), row(1, 5, 2)];
        let report = validate_allocations(&rows, 5);
        assert!(report.row_errors[0].is_clean());
        assert!(
            report.row_errors[1]
                .location
                .as_deref()
                .unwrap()
                .contains("already used")
        );
    }

    #[test]
    fn shortfall_summary_names_the_missing_amount() {
        let rows = vec![row(1, 1, 3)];
        let report = validate_allocations(&rows, 10);
        assert_eq!(
            report.summary.as_deref(),
            Some("Allocate 7 more to match Receive now")
        );
    }

    #[test]
    fn excess_summary_names_the_surplus() {
        let rows = vec![row(1, 1, 12)];
        let report = validate_allocations(&rows, 10);
        assert_eq!(
            report.summary.as_deref(),
            Some("Remove 2 to match Receive now")
        );
    }

    #[test]
    fn exact_sum_is_necessary_and_sufficient_absent_row_errors() {
        // Sufficient: complete rows summing exactly → valid
        for (quantities, target) in [(vec![4_i64, 6], 10_i64), (vec![10], 10), (vec![1, 2, 7], 10)]
        {
            let rows: Vec<AllocationRow> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| row(1, (i + 1) as u32, *q))
                .collect();
            assert!(validate_allocations(&rows, target).is_valid());
        }
        // Necessary: any off-by-one sum → invalid
        let rows = vec![row(1, 1, 9)];
        assert!(!validate_allocations(&rows, 10).is_valid());
    }

    #[test]
    fn wire_conversion_drops_blank_rows() {
        let rows = vec![row(2, 3, 5), AllocationRow::default()];
        let wire = to_wire(&rows);
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0].box_no, 2);
        assert_eq!(wire[0].loc_no, 3);
        assert_eq!(wire[0].quantity, 5);
    }

    #[test]
    fn empty_rows_with_zero_target_are_valid() {
        let report = validate_allocations(&[], 0);
        assert!(report.is_valid());
    }
}
