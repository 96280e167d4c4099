// Re-export models
pub use crate::models::*;

pub mod models;

/// Table names as they appear in `audit_logs.table_name`.
pub mod tables {
    pub const MANGA: &str = "manga";
    pub const CHAPTERS: &str = "chapters";
    pub const PAGES: &str = "pages";
}
