use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Kind of document attached to a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Image,
    Pdf,
    Link,
    Other,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Link => "link",
            Self::Other => "other",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "pdf" => Ok(Self::Pdf),
            "link" => Ok(Self::Link),
            "other" => Ok(Self::Other),
            _ => Err(format!("Invalid document kind: {}", s)),
        }
    }
}

/// A document or attachment belonging to a part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub part_id: Uuid,
    pub title: String,
    pub kind: DocumentKind,
    /// Stored filename; absent for link documents.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// External URL for link documents.
    pub url: Option<String>,
    /// Whether this document is the part's cover image.
    #[serde(default)]
    pub is_cover: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            DocumentKind::Image,
            DocumentKind::Pdf,
            DocumentKind::Link,
            DocumentKind::Other,
        ] {
            assert_eq!(kind.as_str().parse::<DocumentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn kind_rejects_unknown() {
        assert!("spreadsheet".parse::<DocumentKind>().is_err());
    }
}
