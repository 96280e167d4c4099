use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, FromRow, PartialEq, Clone)]
pub struct Manga {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub author: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow, PartialEq, Clone)]
pub struct Chapter {
    pub id: String,
    pub manga_id: String,
    pub chapter_number: f64,
    pub title: Option<String>,
    pub page_count: i64,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow, PartialEq, Eq, Clone)]
pub struct Page {
    pub id: String,
    pub chapter_id: String,
    pub page_number: i64,
    pub image_url: String,
}

/// A chapter as shown in the reader: its pages in order plus the
/// neighbouring chapters of the same manga.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReaderChapter {
    pub chapter: Chapter,
    pub pages: Vec<Page>,
    pub prev_chapter: Option<Chapter>,
    pub next_chapter: Option<Chapter>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum AuditOperation {
    Insert,
    Update,
    Delete,
}

impl AuditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOperation::Insert => "INSERT",
            AuditOperation::Update => "UPDATE",
            AuditOperation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown audit operation: {}", self.0)
    }
}

impl std::error::Error for UnknownOperation {}

impl FromStr for AuditOperation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INSERT" => Ok(AuditOperation::Insert),
            "UPDATE" => Ok(AuditOperation::Update),
            "DELETE" => Ok(AuditOperation::Delete),
            _ => Err(UnknownOperation(s.to_string())),
        }
    }
}

impl TryFrom<String> for AuditOperation {
    type Error = UnknownOperation;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One row of the append-only audit trail.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: i64,
    pub table_name: String,
    pub record_id: String,
    pub operation: AuditOperation,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub changed_at: i64,
}

/// A chapter whose stored `page_count` disagrees with its actual pages.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, Eq)]
pub struct PageCountDrift {
    pub chapter_id: String,
    pub stored: i64,
    pub actual: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_operation_parses_case_insensitively() {
        assert_eq!("insert".parse::<AuditOperation>(), Ok(AuditOperation::Insert));
        assert_eq!("UPDATE".parse::<AuditOperation>(), Ok(AuditOperation::Update));
        assert_eq!("Delete".parse::<AuditOperation>(), Ok(AuditOperation::Delete));
        assert!("TRUNCATE".parse::<AuditOperation>().is_err());
    }

    #[test]
    fn audit_operation_serializes_uppercase() {
        let json = serde_json::to_string(&AuditOperation::Insert).unwrap();
        assert_eq!(json, "\"INSERT\"");
    }

    #[test]
    fn audit_operation_deserializes_case_insensitively() {
        let op: AuditOperation = serde_json::from_str("\"insert\"").unwrap();
        assert_eq!(op, AuditOperation::Insert);
        let op: AuditOperation = serde_json::from_str("\"Delete\"").unwrap();
        assert_eq!(op, AuditOperation::Delete);
        assert!(serde_json::from_str::<AuditOperation>("\"TRUNCATE\"").is_err());
    }
}
