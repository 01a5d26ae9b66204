use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A seller parts can be ordered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
}
