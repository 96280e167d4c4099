use crate::api::handlers::{admin, chapter, manga, page};
use crate::api::types::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};
use manga_shelf_storage::Storage;
use tower_http::trace::TraceLayer;

pub fn create_router(storage: Storage) -> Router {
    let state = AppState { storage };
    Router::new()
        .route("/health", get(admin::health_check))
        .route("/mangas", get(manga::list_mangas).post(manga::create_manga))
        .route(
            "/mangas/:id",
            get(manga::get_manga)
                .patch(manga::update_manga)
                .delete(manga::delete_manga),
        )
        .route("/mangas/:id/chapters", get(chapter::list_chapters))
        .route("/chapters", post(chapter::create_chapter))
        .route(
            "/chapters/:id",
            get(chapter::get_chapter)
                .patch(chapter::update_chapter)
                .delete(chapter::delete_chapter),
        )
        .route("/chapters/:id/pages", post(chapter::add_pages))
        .route("/pages/:id", patch(page::update_page).delete(page::delete_page))
        .route("/admin/mangas", get(admin::list_mangas_by_title))
        .route("/admin/consistency", get(admin::consistency_report))
        .route("/audit-logs", get(admin::list_audit_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let storage = Storage::in_memory().await.expect("storage");
        create_router(storage)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_manga_and_chapter(app: &Router) -> (String, String) {
        let (status, manga) = send(
            app,
            "POST",
            "/mangas",
            Some(json!({ "title": "Test Manga", "author": "Author" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let manga_id = manga["id"].as_str().unwrap().to_string();

        let (status, chapter) = send(
            app,
            "POST",
            "/chapters",
            Some(json!({ "manga_id": manga_id, "chapter_number": 1, "title": "Chapter 1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(chapter["page_count"], 0);
        (manga_id, chapter["id"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn health() {
        let app = app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn negative_chapter_number_is_bad_request() {
        let app = app().await;
        let (manga_id, _) = create_manga_and_chapter(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/chapters",
            Some(json!({ "manga_id": manga_id, "chapter_number": -1 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("non-negative"));
    }

    #[tokio::test]
    async fn pages_update_reader_view_and_audit() {
        let app = app().await;
        let (manga_id, chapter_id) = create_manga_and_chapter(&app).await;

        let (status, pages) = send(
            &app,
            "POST",
            &format!("/chapters/{}/pages", chapter_id),
            Some(json!({ "page_urls": "http://example.com/1.jpg\n\nhttp://example.com/2.jpg\n" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(pages.as_array().unwrap().len(), 2);

        let (status, reader) = send(&app, "GET", &format!("/chapters/{}", chapter_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reader["chapter"]["page_count"], 2);
        assert_eq!(reader["pages"][1]["page_number"], 2);
        assert!(reader["prev_chapter"].is_null());

        let page_id = pages[0]["id"].as_str().unwrap();
        let (status, _) = send(&app, "DELETE", &format!("/pages/{}", page_id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, chapters) = send(&app, "GET", &format!("/mangas/{}/chapters", manga_id), None).await;
        assert_eq!(chapters[0]["page_count"], 1);

        let (status, logs) = send(
            &app,
            "GET",
            &format!("/audit-logs?table_name=manga&record_id={}&operation=INSERT", manga_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logs.as_array().unwrap().len(), 1);
        assert_eq!(logs[0]["new_data"]["title"], "Test Manga");

        let (_, report) = send(&app, "GET", "/admin/consistency", None).await;
        assert_eq!(report["status"], "ok");
    }

    #[tokio::test]
    async fn delete_manga_then_not_found() {
        let app = app().await;
        let (manga_id, chapter_id) = create_manga_and_chapter(&app).await;

        let (status, _) = send(&app, "DELETE", &format!("/mangas/{}", manga_id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "GET", &format!("/mangas/{}", manga_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", &format!("/chapters/{}", chapter_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &format!("/mangas/{}", manga_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn page_for_unknown_chapter_is_unprocessable() {
        let app = app().await;

        let (status, _) = send(
            &app,
            "POST",
            "/chapters/missing/pages",
            Some(json!({ "urls": ["http://example.com/1.jpg"] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            &app,
            "POST",
            "/chapters/missing/pages",
            Some(json!({ "page_urls": "  \n" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_listing_is_alphabetical() {
        let app = app().await;
        for title in ["Naruto", "Bleach"] {
            send(&app, "POST", "/mangas", Some(json!({ "title": title }))).await;
        }

        let (_, mangas) = send(&app, "GET", "/admin/mangas", None).await;
        assert_eq!(mangas[0]["title"], "Bleach");
        assert_eq!(mangas[1]["title"], "Naruto");
    }

    #[tokio::test]
    async fn patch_with_null_clears_and_missing_keeps() {
        let app = app().await;
        let (manga_id, chapter_id) = create_manga_and_chapter(&app).await;

        let (status, manga) = send(
            &app,
            "PATCH",
            &format!("/mangas/{}", manga_id),
            Some(json!({ "author": null, "description": "Pirates" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(manga["author"].is_null());
        assert_eq!(manga["description"], "Pirates");
        assert_eq!(manga["title"], "Test Manga");

        let (status, chapter) = send(
            &app,
            "PATCH",
            &format!("/chapters/{}", chapter_id),
            Some(json!({ "title": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(chapter["title"].is_null());
        assert_eq!(chapter["chapter_number"], 1.0);
    }

    #[tokio::test]
    async fn audit_operation_filter_ignores_case() {
        let app = app().await;
        let (manga_id, _) = create_manga_and_chapter(&app).await;

        for operation in ["insert", "Insert", "INSERT"] {
            let (status, logs) = send(
                &app,
                "GET",
                &format!(
                    "/audit-logs?table_name=manga&record_id={}&operation={}",
                    manga_id, operation
                ),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(logs.as_array().unwrap().len(), 1);
            assert_eq!(logs[0]["operation"], "INSERT");
        }

        let (status, _) = send(&app, "GET", "/audit-logs?operation=truncate", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mutating_missing_records_is_not_found() {
        let app = app().await;

        let (status, body) = send(
            &app,
            "PATCH",
            "/chapters/missing",
            Some(json!({ "chapter_number": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");

        let (status, _) = send(&app, "DELETE", "/chapters/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "PATCH", "/pages/missing", Some(json!({ "page_number": 3 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", "/pages/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "PATCH", "/mangas/missing", Some(json!({ "title": "X" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
