use crate::api::types::{double_option, AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use manga_shelf_common::models::Manga;
use manga_shelf_storage::{CreateMangaParams, UpdateMangaParams};
use serde::Deserialize;

pub async fn list_mangas(State(state): State<AppState>) -> Result<Json<Vec<Manga>>, AppError> {
    match state.storage.list_mangas().await {
        Ok(mangas) => Ok(Json(mangas)),
        Err(e) => {
            tracing::error!("Failed to list mangas: {:?}", e);
            Err(e.into())
        }
    }
}

#[derive(Deserialize)]
pub struct CreateMangaRequest {
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub author: Option<String>,
}

pub async fn create_manga(
    State(state): State<AppState>,
    Json(payload): Json<CreateMangaRequest>,
) -> Result<(StatusCode, Json<Manga>), AppError> {
    let params = CreateMangaParams {
        title: payload.title,
        description: payload.description,
        cover_url: payload.cover_url,
        author: payload.author,
    };

    match state.storage.create_manga(params).await {
        Ok(manga) => Ok((StatusCode::CREATED, Json(manga))),
        Err(e) => {
            tracing::error!("Failed to create manga: {:?}", e);
            Err(e.into())
        }
    }
}

pub async fn get_manga(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Manga>, AppError> {
    match state.storage.get_manga(&id).await {
        Ok(Some(manga)) => Ok(Json(manga)),
        Ok(None) => Err(AppError::NotFound("Manga not found".to_string())),
        Err(e) => {
            tracing::error!("Failed to get manga: {:?}", e);
            Err(e.into())
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateMangaRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub author: Option<Option<String>>,
}

pub async fn update_manga(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMangaRequest>,
) -> Result<Json<Manga>, AppError> {
    let params = UpdateMangaParams {
        title: payload.title,
        description: payload.description,
        cover_url: payload.cover_url,
        author: payload.author,
    };

    match state.storage.update_manga(&id, params).await {
        Ok(manga) => Ok(Json(manga)),
        Err(e) => {
            tracing::error!("Failed to update manga: {:?}", e);
            Err(e.into())
        }
    }
}

/// Removes the manga with all of its chapters and pages.
pub async fn delete_manga(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Manga>, AppError> {
    match state.storage.delete_manga(&id).await {
        Ok(manga) => Ok(Json(manga)),
        Err(e) => {
            tracing::error!("Failed to delete manga: {:?}", e);
            Err(e.into())
        }
    }
}
