use sqlx::{Pool, Sqlite};

use crate::error::Result;

/// Creates tables and indexes if they do not exist yet.
///
/// Foreign keys deliberately carry no `ON DELETE CASCADE`: cascades run
/// through `Storage::delete_manga` / `Storage::delete_chapter` so that every
/// removed row is audited. A bare `DELETE` of a parent with children fails.
pub async fn apply(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS manga (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK (length(trim(title)) > 0),
            description TEXT,
            cover_url TEXT,
            author TEXT,
            created_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS chapters (
            id TEXT PRIMARY KEY,
            manga_id TEXT NOT NULL,
            chapter_number REAL NOT NULL CHECK (chapter_number >= 0),
            title TEXT,
            page_count INTEGER NOT NULL DEFAULT 0 CHECK (page_count >= 0),
            created_at INTEGER NOT NULL,
            FOREIGN KEY(manga_id) REFERENCES manga(id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS pages (
            id TEXT PRIMARY KEY,
            chapter_id TEXT NOT NULL,
            page_number INTEGER NOT NULL CHECK (page_number >= 1),
            image_url TEXT NOT NULL,
            UNIQUE (chapter_id, page_number),
            FOREIGN KEY(chapter_id) REFERENCES chapters(id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS audit_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            table_name TEXT NOT NULL,
            record_id TEXT NOT NULL,
            operation TEXT NOT NULL CHECK (operation IN ('INSERT', 'UPDATE', 'DELETE')),
            old_data TEXT,
            new_data TEXT,
            changed_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chapters_manga ON chapters(manga_id, chapter_number)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_audit_logs_record ON audit_logs(table_name, record_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
