use manga_shelf_common::models::{AuditOperation, Manga};
use manga_shelf_common::tables;

use crate::error::{Result, StorageError};
use crate::{audit, chapter, validation, CreateMangaParams, Storage, UpdateMangaParams};

impl Storage {
    pub async fn create_manga(&self, params: CreateMangaParams) -> Result<Manga> {
        validation::manga_title(&params.title)?;

        let manga_id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        let manga = sqlx::query_as::<_, Manga>(
            "INSERT INTO manga (id, title, description, cover_url, author, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&manga_id)
        .bind(&params.title)
        .bind(&params.description)
        .bind(&params.cover_url)
        .bind(&params.author)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        audit::record(
            &mut tx,
            tables::MANGA,
            &manga.id,
            AuditOperation::Insert,
            None,
            Some(&manga),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Created manga: {} ({})", manga.title, manga.id);
        Ok(manga)
    }

    pub async fn update_manga(&self, id: &str, params: UpdateMangaParams) -> Result<Manga> {
        if let Some(title) = &params.title {
            validation::manga_title(title)?;
        }

        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, Manga>("SELECT * FROM manga WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::not_found("manga", id))?;

        let new = sqlx::query_as::<_, Manga>(
            "UPDATE manga SET title = ?, description = ?, cover_url = ?, author = ? WHERE id = ? RETURNING *",
        )
        .bind(params.title.as_ref().unwrap_or(&old.title))
        .bind(params.description.as_ref().unwrap_or(&old.description))
        .bind(params.cover_url.as_ref().unwrap_or(&old.cover_url))
        .bind(params.author.as_ref().unwrap_or(&old.author))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        audit::record(
            &mut tx,
            tables::MANGA,
            id,
            AuditOperation::Update,
            Some(&old),
            Some(&new),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Updated manga: {} ({})", new.title, new.id);
        Ok(new)
    }

    /// Deletes a manga together with its chapters and their pages. Every
    /// removed row gets its own audit entry.
    pub async fn delete_manga(&self, id: &str) -> Result<Manga> {
        let mut tx = self.pool.begin().await?;

        let chapter_ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM chapters WHERE manga_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        for chapter_id in &chapter_ids {
            chapter::delete_with_pages(&mut tx, chapter_id).await?;
        }

        let manga = sqlx::query_as::<_, Manga>("DELETE FROM manga WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::not_found("manga", id))?;

        audit::record(
            &mut tx,
            tables::MANGA,
            id,
            AuditOperation::Delete,
            Some(&manga),
            None,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Deleted manga {} ({}) with {} chapters",
            manga.title,
            manga.id,
            chapter_ids.len()
        );
        Ok(manga)
    }

    /// Newest first.
    pub async fn list_mangas(&self) -> Result<Vec<Manga>> {
        let mangas = sqlx::query_as::<_, Manga>(
            "SELECT * FROM manga ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(mangas)
    }

    /// Alphabetical, for the admin screen.
    pub async fn list_mangas_by_title(&self) -> Result<Vec<Manga>> {
        let mangas = sqlx::query_as::<_, Manga>("SELECT * FROM manga ORDER BY title ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(mangas)
    }

    pub async fn get_manga(&self, id: &str) -> Result<Option<Manga>> {
        let manga = sqlx::query_as::<_, Manga>("SELECT * FROM manga WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(manga)
    }
}
