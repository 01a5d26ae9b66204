use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a shopping list.
///
/// Concept lists are freely editable drafts. Ready lists are being ordered
/// and received, grouped by seller. Done lists are archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Concept,
    Ready,
    Done,
}

impl ListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Ready => "ready",
            Self::Done => "done",
        }
    }

    /// Whether lines may still be added, edited, or removed.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Concept)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl FromStr for ListStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concept" => Ok(Self::Concept),
            "ready" => Ok(Self::Ready),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid list status: {}", s)),
        }
    }
}

/// Status of a single demand line on a shopping list.
///
/// Transitions run monotonically forward (new → ordered → done) with one
/// explicit revert path (ordered → new) for lines nothing has arrived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    New,
    Ordered,
    Done,
}

impl LineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Ordered => "ordered",
            Self::Done => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: LineStatus) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Ordered)
                | (Self::Ordered, Self::Done)
                | (Self::Ordered, Self::New)
        )
    }
}

impl FromStr for LineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "ordered" => Ok(Self::Ordered),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid line status: {}", s)),
        }
    }
}

/// Minimal seller reference embedded in line payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRef {
    pub id: Uuid,
    pub name: String,
}

/// Free-text order note attached to one seller group of a list.
///
/// `seller_id` of `None` addresses the ungrouped lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerOrderNote {
    pub seller_id: Option<Uuid>,
    pub note: String,
}

/// A shopping list as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ListStatus,
    #[serde(default)]
    pub lines: Vec<ShoppingListLine>,
    #[serde(default)]
    pub order_notes: Vec<SellerOrderNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// One demand line on a shopping list, as returned by the backend.
///
/// `effective_seller` is resolved server-side: the line's explicit seller
/// override if set, otherwise the part's preferred seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListLine {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub part_id: Uuid,
    pub part_description: String,
    pub manufacturer_code: Option<String>,
    /// Explicit per-line seller override, if any.
    pub seller_id: Option<Uuid>,
    pub effective_seller: Option<SellerRef>,
    pub needed: i64,
    pub ordered: i64,
    pub received: i64,
    pub status: LineStatus,
    pub note: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_status_forward_transitions() {
        assert!(LineStatus::New.can_transition_to(LineStatus::Ordered));
        assert!(LineStatus::Ordered.can_transition_to(LineStatus::Done));
    }

    #[test]
    fn line_status_revert_is_only_from_ordered() {
        assert!(LineStatus::Ordered.can_transition_to(LineStatus::New));
        assert!(!LineStatus::Done.can_transition_to(LineStatus::New));
        assert!(!LineStatus::Done.can_transition_to(LineStatus::Ordered));
        assert!(!LineStatus::New.can_transition_to(LineStatus::Done));
    }

    #[test]
    fn line_status_no_self_transitions() {
        for s in [LineStatus::New, LineStatus::Ordered, LineStatus::Done] {
            assert!(!s.can_transition_to(s));
        }
    }

    #[test]
    fn statuses_round_trip_through_str() {
        for s in [ListStatus::Concept, ListStatus::Ready, ListStatus::Done] {
            assert_eq!(s.as_str().parse::<ListStatus>().unwrap(), s);
        }
        for s in [LineStatus::New, LineStatus::Ordered, LineStatus::Done] {
            assert_eq!(s.as_str().parse::<LineStatus>().unwrap(), s);
        }
    }

    #[test]
    fn statuses_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&ListStatus::Concept).unwrap(),
            r#""concept""#
        );
        assert_eq!(
            serde_json::to_string(&LineStatus::Ordered).unwrap(),
            r#""ordered""#
        );
    }
}
