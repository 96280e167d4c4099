mod api;
mod config;

use anyhow::Result;
use clap::Parser;
use manga_shelf_storage::Storage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "manga_shelf=debug,manga_shelf_storage=debug,tower_http=debug".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::parse();
    tracing::info!("Starting Manga Shelf on port {}", config.port);

    let storage = match &config.database_url {
        Some(url) => Storage::connect(url).await?,
        None => Storage::new(&config.data_dir).await?,
    };

    api::server::serve(config.port, storage).await?;

    Ok(())
}
