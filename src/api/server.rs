use anyhow::Result;
use manga_shelf_storage::Storage;
use tokio::net::TcpListener;

pub async fn serve(port: u16, storage: Storage) -> Result<()> {
    let app = super::routes::create_router(storage);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
