use manga_shelf_common::models::{AuditOperation, Page};
use manga_shelf_common::tables;
use sqlx::SqliteConnection;

use crate::error::{Result, StorageError};
use crate::{audit, page_count, validation, CreatePageParams, Storage, UpdatePageParams};

async fn insert(conn: &mut SqliteConnection, params: &CreatePageParams) -> Result<Page> {
    let page = sqlx::query_as::<_, Page>(
        "INSERT INTO pages (id, chapter_id, page_number, image_url) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&params.chapter_id)
    .bind(params.page_number)
    .bind(&params.image_url)
    .fetch_one(&mut *conn)
    .await?;

    page_count::adjust(conn, &page.chapter_id, 1).await?;

    audit::record(
        conn,
        tables::PAGES,
        &page.id,
        AuditOperation::Insert,
        None,
        Some(&page),
    )
    .await?;

    Ok(page)
}

/// Splits the admin form's newline separated URL list, dropping blank lines.
pub fn parse_page_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl Storage {
    pub async fn create_page(&self, params: CreatePageParams) -> Result<Page> {
        validation::page_number(params.page_number)?;
        validation::image_url(&params.image_url)?;

        let mut tx = self.pool.begin().await?;
        let page = insert(&mut tx, &params).await?;
        tx.commit().await?;

        tracing::debug!(
            "Added page {} to chapter {}",
            page.page_number,
            page.chapter_id
        );
        Ok(page)
    }

    /// Appends pages in the given order. Numbering continues after the
    /// chapter's highest page number, so an empty chapter gets 1..=N.
    pub async fn add_pages(&self, chapter_id: &str, urls: Vec<String>) -> Result<Vec<Page>> {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        let mut tx = self.pool.begin().await?;

        let last: Option<i64> =
            sqlx::query_scalar("SELECT MAX(page_number) FROM pages WHERE chapter_id = ?")
                .bind(chapter_id)
                .fetch_one(&mut *tx)
                .await?;
        let last = last.unwrap_or(0);

        let mut pages = Vec::with_capacity(urls.len());
        for (offset, image_url) in urls.into_iter().enumerate() {
            let page_number = i64::try_from(offset)
                .ok()
                .and_then(|offset| last.checked_add(offset)?.checked_add(1))
                .ok_or_else(|| {
                    StorageError::Integrity(format!(
                        "no page numbers left after {} in chapter {}",
                        last, chapter_id
                    ))
                })?;
            let params = CreatePageParams {
                chapter_id: chapter_id.to_string(),
                page_number,
                image_url,
            };
            pages.push(insert(&mut tx, &params).await?);
        }

        tx.commit().await?;

        tracing::info!("Added {} pages to chapter {}", pages.len(), chapter_id);
        Ok(pages)
    }

    /// Updates a page. Moving it to another chapter is counted as a removal
    /// from the old chapter and an addition to the new one.
    pub async fn update_page(&self, id: &str, params: UpdatePageParams) -> Result<Page> {
        if let Some(number) = params.page_number {
            validation::page_number(number)?;
        }
        if let Some(url) = &params.image_url {
            validation::image_url(url)?;
        }

        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::not_found("page", id))?;

        let new = sqlx::query_as::<_, Page>(
            "UPDATE pages SET chapter_id = ?, page_number = ?, image_url = ? WHERE id = ? RETURNING *",
        )
        .bind(params.chapter_id.as_ref().unwrap_or(&old.chapter_id))
        .bind(params.page_number.unwrap_or(old.page_number))
        .bind(params.image_url.as_ref().unwrap_or(&old.image_url))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if new.chapter_id != old.chapter_id {
            page_count::adjust(&mut tx, &old.chapter_id, -1).await?;
            page_count::adjust(&mut tx, &new.chapter_id, 1).await?;
            tracing::info!(
                "Moved page {} from chapter {} to {}",
                id,
                old.chapter_id,
                new.chapter_id
            );
        }

        audit::record(
            &mut tx,
            tables::PAGES,
            id,
            AuditOperation::Update,
            Some(&old),
            Some(&new),
        )
        .await?;

        tx.commit().await?;
        Ok(new)
    }

    pub async fn delete_page(&self, id: &str) -> Result<Page> {
        let mut tx = self.pool.begin().await?;

        let page = sqlx::query_as::<_, Page>("DELETE FROM pages WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::not_found("page", id))?;

        page_count::adjust(&mut tx, &page.chapter_id, -1).await?;

        audit::record(
            &mut tx,
            tables::PAGES,
            id,
            AuditOperation::Delete,
            Some(&page),
            None,
        )
        .await?;

        tx.commit().await?;

        tracing::debug!(
            "Deleted page {} from chapter {}",
            page.page_number,
            page.chapter_id
        );
        Ok(page)
    }

    pub async fn get_page(&self, id: &str) -> Result<Option<Page>> {
        let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    pub async fn list_pages(&self, chapter_id: &str) -> Result<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(
            "SELECT * FROM pages WHERE chapter_id = ? ORDER BY page_number ASC",
        )
        .bind(chapter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(pages)
    }
}
