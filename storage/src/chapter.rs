use manga_shelf_common::models::{AuditOperation, Chapter, Page, ReaderChapter};
use manga_shelf_common::tables;
use sqlx::SqliteConnection;

use crate::error::{Result, StorageError};
use crate::{audit, validation, CreateChapterParams, Storage, UpdateChapterParams};

/// Removes a chapter and its pages on the caller's transaction, auditing each
/// row. The pages go first; the chapter's own counter is not decremented
/// since the row disappears with them.
pub(crate) async fn delete_with_pages(
    conn: &mut SqliteConnection,
    chapter_id: &str,
) -> Result<Chapter> {
    let pages = sqlx::query_as::<_, Page>("DELETE FROM pages WHERE chapter_id = ? RETURNING *")
        .bind(chapter_id)
        .fetch_all(&mut *conn)
        .await?;

    for page in &pages {
        audit::record(
            conn,
            tables::PAGES,
            &page.id,
            AuditOperation::Delete,
            Some(page),
            None,
        )
        .await?;
    }

    let chapter = sqlx::query_as::<_, Chapter>("DELETE FROM chapters WHERE id = ? RETURNING *")
        .bind(chapter_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StorageError::not_found("chapter", chapter_id))?;

    audit::record(
        conn,
        tables::CHAPTERS,
        &chapter.id,
        AuditOperation::Delete,
        Some(&chapter),
        None,
    )
    .await?;

    tracing::debug!(
        chapter_id,
        pages = pages.len(),
        "chapter deleted with its pages"
    );
    Ok(chapter)
}

impl Storage {
    pub async fn create_chapter(&self, params: CreateChapterParams) -> Result<Chapter> {
        validation::chapter_number(params.chapter_number)?;

        let chapter_id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        let chapter = sqlx::query_as::<_, Chapter>(
            "INSERT INTO chapters (id, manga_id, chapter_number, title, page_count, created_at) VALUES (?, ?, ?, ?, 0, ?) RETURNING *",
        )
        .bind(&chapter_id)
        .bind(&params.manga_id)
        .bind(params.chapter_number)
        .bind(&params.title)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        audit::record(
            &mut tx,
            tables::CHAPTERS,
            &chapter.id,
            AuditOperation::Insert,
            None,
            Some(&chapter),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Created chapter {} (number {}) for manga {}",
            chapter.id,
            chapter.chapter_number,
            chapter.manga_id
        );
        Ok(chapter)
    }

    pub async fn update_chapter(&self, id: &str, params: UpdateChapterParams) -> Result<Chapter> {
        if let Some(number) = params.chapter_number {
            validation::chapter_number(number)?;
        }

        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::not_found("chapter", id))?;

        let new = sqlx::query_as::<_, Chapter>(
            "UPDATE chapters SET chapter_number = ?, title = ? WHERE id = ? RETURNING *",
        )
        .bind(params.chapter_number.unwrap_or(old.chapter_number))
        .bind(params.title.as_ref().unwrap_or(&old.title))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        audit::record(
            &mut tx,
            tables::CHAPTERS,
            id,
            AuditOperation::Update,
            Some(&old),
            Some(&new),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Updated chapter {} (number {})", new.id, new.chapter_number);
        Ok(new)
    }

    /// Deletes a chapter and all of its pages.
    pub async fn delete_chapter(&self, id: &str) -> Result<Chapter> {
        let mut tx = self.pool.begin().await?;
        let chapter = delete_with_pages(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!("Deleted chapter {} (number {})", chapter.id, chapter.chapter_number);
        Ok(chapter)
    }

    pub async fn get_chapter(&self, id: &str) -> Result<Option<Chapter>> {
        let chapter = sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(chapter)
    }

    pub async fn list_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let chapters = sqlx::query_as::<_, Chapter>(
            "SELECT * FROM chapters WHERE manga_id = ? ORDER BY chapter_number ASC",
        )
        .bind(manga_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(chapters)
    }

    /// The chapter with its ordered pages and the neighbouring chapters of
    /// the same manga.
    pub async fn reader_chapter(&self, id: &str) -> Result<Option<ReaderChapter>> {
        let chapter = match self.get_chapter(id).await? {
            Some(c) => c,
            None => return Ok(None),
        };

        let pages = self.list_pages(id).await?;

        let prev_chapter = sqlx::query_as::<_, Chapter>(
            "SELECT * FROM chapters WHERE manga_id = ? AND chapter_number < ? ORDER BY chapter_number DESC LIMIT 1",
        )
        .bind(&chapter.manga_id)
        .bind(chapter.chapter_number)
        .fetch_optional(&self.pool)
        .await?;

        let next_chapter = sqlx::query_as::<_, Chapter>(
            "SELECT * FROM chapters WHERE manga_id = ? AND chapter_number > ? ORDER BY chapter_number ASC LIMIT 1",
        )
        .bind(&chapter.manga_id)
        .bind(chapter.chapter_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(Some(ReaderChapter {
            chapter,
            pages,
            prev_chapter,
            next_chapter,
        }))
    }
}
