//! Append-only audit trail.
//!
//! `record` is called by every write path on the connection of its open
//! transaction, so the audit row commits or rolls back together with the
//! mutation it describes.

use manga_shelf_common::models::{AuditEntry, AuditOperation};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::error::{Result, StorageError};
use crate::Storage;

pub async fn record<T: Serialize>(
    conn: &mut SqliteConnection,
    table_name: &str,
    record_id: &str,
    operation: AuditOperation,
    old: Option<&T>,
    new: Option<&T>,
) -> Result<()> {
    let old_data = old.map(serde_json::to_string).transpose()?;
    let new_data = new.map(serde_json::to_string).transpose()?;
    let changed_at = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO audit_logs (table_name, record_id, operation, old_data, new_data, changed_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(table_name)
    .bind(record_id)
    .bind(operation.as_str())
    .bind(old_data)
    .bind(new_data)
    .bind(changed_at)
    .execute(&mut *conn)
    .await?;

    tracing::debug!(table_name, record_id, %operation, "audit entry appended");
    Ok(())
}

/// Query filter for `Storage::audit_logs`. Unset fields match everything.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuditFilter {
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub operation: Option<AuditOperation>,
}

#[derive(FromRow)]
struct AuditRow {
    id: i64,
    table_name: String,
    record_id: String,
    operation: String,
    old_data: Option<String>,
    new_data: Option<String>,
    changed_at: i64,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = StorageError;

    fn try_from(row: AuditRow) -> Result<Self> {
        let operation = row
            .operation
            .parse::<AuditOperation>()
            .map_err(|e| StorageError::Integrity(e.to_string()))?;

        Ok(AuditEntry {
            id: row.id,
            table_name: row.table_name,
            record_id: row.record_id,
            operation,
            old_data: row.old_data.as_deref().map(serde_json::from_str).transpose()?,
            new_data: row.new_data.as_deref().map(serde_json::from_str).transpose()?,
            changed_at: row.changed_at,
        })
    }
}

impl Storage {
    pub async fn audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM audit_logs WHERE 1 = 1");

        if let Some(table_name) = &filter.table_name {
            query.push(" AND table_name = ").push_bind(table_name);
        }
        if let Some(record_id) = &filter.record_id {
            query.push(" AND record_id = ").push_bind(record_id);
        }
        if let Some(operation) = filter.operation {
            query.push(" AND operation = ").push_bind(operation.as_str());
        }
        query.push(" ORDER BY id ASC");

        let rows = query
            .build_query_as::<AuditRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}
