use crate::api::types::{AppError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use manga_shelf_common::models::{AuditEntry, Manga};
use manga_shelf_storage::AuditFilter;
use serde_json::json;

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn list_mangas_by_title(
    State(state): State<AppState>,
) -> Result<Json<Vec<Manga>>, AppError> {
    match state.storage.list_mangas_by_title().await {
        Ok(mangas) => Ok(Json(mangas)),
        Err(e) => {
            tracing::error!("Failed to list mangas by title: {:?}", e);
            Err(e.into())
        }
    }
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(filter): Query<AuditFilter>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    match state.storage.audit_logs(&filter).await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => {
            tracing::error!("Failed to query audit logs: {:?}", e);
            Err(e.into())
        }
    }
}

pub async fn consistency_report(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let drift = match state.storage.page_count_drift().await {
        Ok(drift) => drift,
        Err(e) => {
            tracing::error!("Failed to compute page count drift: {:?}", e);
            return Err(e.into());
        }
    };
    if !drift.is_empty() {
        tracing::warn!("{} chapters have a drifted page count", drift.len());
    }

    Ok(Json(json!({
        "status": if drift.is_empty() { "ok" } else { "drift" },
        "drift": drift
    })))
}
