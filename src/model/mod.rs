//! Wire schemas for the inventory backend's REST resources.
//!
//! These types mirror the backend's JSON payloads one-to-one. View-model
//! derivation (sorting, grouping, derived flags) lives in `crate::shopping`;
//! nothing in this module computes anything.

pub mod boxes;
pub mod document;
pub mod kit;
pub mod part;
pub mod seller;
pub mod shopping_list;

pub use boxes::{BoxDetail, BoxLocation, BoxSummary};
pub use document::{Document, DocumentKind};
pub use kit::{Kit, KitContent};
pub use part::Part;
pub use seller::Seller;
pub use shopping_list::{
    LineStatus, ListStatus, SellerOrderNote, SellerRef, ShoppingList, ShoppingListLine,
};
