use crate::api::types::{double_option, AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use manga_shelf_common::models::{Chapter, Page, ReaderChapter};
use manga_shelf_storage::{parse_page_urls, CreateChapterParams, UpdateChapterParams};
use serde::Deserialize;

pub async fn list_chapters(
    State(state): State<AppState>,
    Path(manga_id): Path<String>,
) -> Result<Json<Vec<Chapter>>, AppError> {
    match state.storage.list_chapters(&manga_id).await {
        Ok(chapters) => Ok(Json(chapters)),
        Err(e) => {
            tracing::error!("Failed to list chapters: {:?}", e);
            Err(e.into())
        }
    }
}

#[derive(Deserialize)]
pub struct CreateChapterRequest {
    pub manga_id: String,
    pub chapter_number: f64,
    pub title: Option<String>,
}

pub async fn create_chapter(
    State(state): State<AppState>,
    Json(payload): Json<CreateChapterRequest>,
) -> Result<(StatusCode, Json<Chapter>), AppError> {
    let params = CreateChapterParams {
        manga_id: payload.manga_id,
        chapter_number: payload.chapter_number,
        title: payload.title,
    };

    match state.storage.create_chapter(params).await {
        Ok(chapter) => Ok((StatusCode::CREATED, Json(chapter))),
        Err(e) if e.is_validation() => {
            tracing::warn!("Rejected chapter: {}", e);
            Err(e.into())
        }
        Err(e) => {
            tracing::error!("Failed to create chapter: {:?}", e);
            Err(e.into())
        }
    }
}

/// Reader view: the chapter, its pages and the neighbouring chapters.
pub async fn get_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReaderChapter>, AppError> {
    match state.storage.reader_chapter(&id).await {
        Ok(Some(chapter)) => Ok(Json(chapter)),
        Ok(None) => Err(AppError::NotFound("Chapter not found".to_string())),
        Err(e) => {
            tracing::error!("Failed to get chapter: {:?}", e);
            Err(e.into())
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateChapterRequest {
    pub chapter_number: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
}

pub async fn update_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateChapterRequest>,
) -> Result<Json<Chapter>, AppError> {
    let params = UpdateChapterParams {
        chapter_number: payload.chapter_number,
        title: payload.title,
    };

    match state.storage.update_chapter(&id, params).await {
        Ok(chapter) => Ok(Json(chapter)),
        Err(e) => {
            tracing::error!("Failed to update chapter: {:?}", e);
            Err(e.into())
        }
    }
}

pub async fn delete_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Chapter>, AppError> {
    match state.storage.delete_chapter(&id).await {
        Ok(chapter) => Ok(Json(chapter)),
        Err(e) => {
            tracing::error!("Failed to delete chapter: {:?}", e);
            Err(e.into())
        }
    }
}

/// Either the admin form's newline separated `page_urls`, or a JSON list.
#[derive(Deserialize)]
pub struct AddPagesRequest {
    pub page_urls: Option<String>,
    pub urls: Option<Vec<String>>,
}

pub async fn add_pages(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    Json(payload): Json<AddPagesRequest>,
) -> Result<(StatusCode, Json<Vec<Page>>), AppError> {
    let mut urls = payload
        .page_urls
        .as_deref()
        .map(parse_page_urls)
        .unwrap_or_default();
    urls.extend(payload.urls.unwrap_or_default());

    if urls.is_empty() {
        return Err(AppError::BadRequest("No page URLs given".to_string()));
    }

    match state.storage.add_pages(&chapter_id, urls).await {
        Ok(pages) => Ok((StatusCode::CREATED, Json(pages))),
        Err(e) => {
            tracing::error!("Failed to add pages to chapter {}: {:?}", chapter_id, e);
            Err(e.into())
        }
    }
}
