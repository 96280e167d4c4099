//! Maintenance of the denormalized `chapters.page_count` column.

use manga_shelf_common::models::PageCountDrift;
use sqlx::SqliteConnection;

use crate::error::{Result, StorageError};
use crate::Storage;

/// Shifts a chapter's page count by `delta` on the caller's transaction.
///
/// The single-statement `UPDATE` holds the write lock for the whole
/// read-modify-write, so concurrent adjustments cannot lose updates.
pub async fn adjust(conn: &mut SqliteConnection, chapter_id: &str, delta: i64) -> Result<()> {
    let result = sqlx::query(
        "UPDATE chapters SET page_count = page_count + ? WHERE id = ? AND page_count + ? >= 0",
    )
    .bind(delta)
    .bind(chapter_id)
    .bind(delta)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        tracing::trace!(chapter_id, delta, "page count adjusted");
        return Ok(());
    }

    let exists = sqlx::query("SELECT 1 FROM chapters WHERE id = ?")
        .bind(chapter_id)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Err(StorageError::Integrity(format!(
            "page count of chapter {} would become negative",
            chapter_id
        ))),
        None => Err(StorageError::not_found("chapter", chapter_id)),
    }
}

impl Storage {
    /// Chapters whose stored page count differs from their actual pages.
    /// Empty whenever the write pipeline is the only writer.
    pub async fn page_count_drift(&self) -> Result<Vec<PageCountDrift>> {
        let drift = sqlx::query_as::<_, PageCountDrift>(
            "SELECT c.id AS chapter_id, c.page_count AS stored, COUNT(p.id) AS actual
             FROM chapters c
             LEFT JOIN pages p ON p.chapter_id = c.id
             GROUP BY c.id, c.page_count
             HAVING c.page_count != COUNT(p.id)
             ORDER BY c.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(drift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CreateChapterParams, CreateMangaParams};

    async fn seeded_chapter(storage: &Storage) -> String {
        let manga = storage
            .create_manga(CreateMangaParams {
                title: "Counter".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        storage
            .create_chapter(CreateChapterParams {
                manga_id: manga.id,
                chapter_number: 1.0,
                title: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn adjust_refuses_to_go_negative() {
        let storage = Storage::in_memory().await.unwrap();
        let chapter_id = seeded_chapter(&storage).await;

        let mut conn = storage.pool.acquire().await.unwrap();
        let err = adjust(&mut conn, &chapter_id, -1).await.unwrap_err();
        assert!(matches!(err, StorageError::Integrity(_)));

        adjust(&mut conn, &chapter_id, 2).await.unwrap();
        adjust(&mut conn, &chapter_id, -1).await.unwrap();
        drop(conn);

        let chapter = storage.get_chapter(&chapter_id).await.unwrap().unwrap();
        assert_eq!(chapter.page_count, 1);
    }

    #[tokio::test]
    async fn adjust_unknown_chapter_is_not_found() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.pool.acquire().await.unwrap();

        let err = adjust(&mut conn, "missing", 1).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "chapter", .. }));
    }

    #[tokio::test]
    async fn drift_reports_tampered_counts() {
        let storage = Storage::in_memory().await.unwrap();
        let chapter_id = seeded_chapter(&storage).await;
        assert!(storage.page_count_drift().await.unwrap().is_empty());

        sqlx::query("UPDATE chapters SET page_count = 3 WHERE id = ?")
            .bind(&chapter_id)
            .execute(&storage.pool)
            .await
            .unwrap();

        let drift = storage.page_count_drift().await.unwrap();
        assert_eq!(
            drift,
            vec![PageCountDrift {
                chapter_id,
                stored: 3,
                actual: 0,
            }]
        );
    }
}
