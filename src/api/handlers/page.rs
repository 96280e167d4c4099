use crate::api::types::{AppError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use manga_shelf_common::models::Page;
use manga_shelf_storage::UpdatePageParams;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct UpdatePageRequest {
    pub chapter_id: Option<String>,
    pub page_number: Option<i64>,
    pub image_url: Option<String>,
}

pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePageRequest>,
) -> Result<Json<Page>, AppError> {
    let params = UpdatePageParams {
        chapter_id: payload.chapter_id,
        page_number: payload.page_number,
        image_url: payload.image_url,
    };

    match state.storage.update_page(&id, params).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            tracing::error!("Failed to update page: {:?}", e);
            Err(e.into())
        }
    }
}

pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Page>, AppError> {
    match state.storage.delete_page(&id).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            tracing::error!("Failed to delete page: {:?}", e);
            Err(e.into())
        }
    }
}
