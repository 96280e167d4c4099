//! SQLite-backed catalog storage.
//!
//! Every write goes through a transactional pipeline: validate, mutate,
//! append to `audit_logs`, maintain `chapters.page_count`, commit. Any
//! failing step drops the transaction and nothing of the write survives.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::fs;

pub mod audit;
mod chapter;
pub mod error;
mod manga;
mod page;
pub mod page_count;
pub mod schema;
pub mod validation;

pub use audit::AuditFilter;
pub use error::{Result, StorageError};
pub use page::parse_page_urls;

#[derive(Clone)]
pub struct Storage {
    pub pool: Pool<Sqlite>,
}

impl Storage {
    /// Opens (or creates) `manga.db` inside `data_dir`.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let path = PathBuf::from(data_dir);
        if !path.exists() {
            fs::create_dir_all(&path).await?;
        }

        let db_path = path.join("manga.db");
        let db_url = format!("sqlite://{}", db_path.to_string_lossy());
        Self::connect(&db_url).await
    }

    pub async fn connect(db_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = pool_options().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database, used by tests.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = pool_options().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: Pool<Sqlite>) -> Result<Self> {
        schema::apply(&pool).await?;
        Ok(Self { pool })
    }
}

/// One connection: every transaction, page count updates included, runs
/// serially. It is never recycled, since an in-memory database lives only as
/// long as its connection.
fn pool_options() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
}

#[derive(Debug, Default, Clone)]
pub struct CreateMangaParams {
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub author: Option<String>,
}

/// Fields left as `None` keep their current value. For the optional
/// columns, `Some(None)` clears the stored value.
#[derive(Debug, Default, Clone)]
pub struct UpdateMangaParams {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub cover_url: Option<Option<String>>,
    pub author: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct CreateChapterParams {
    pub manga_id: String,
    pub chapter_number: f64,
    pub title: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct UpdateChapterParams {
    pub chapter_number: Option<f64>,
    /// `Some(None)` clears the title.
    pub title: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct CreatePageParams {
    pub chapter_id: String,
    pub page_number: i64,
    pub image_url: String,
}

/// Setting `chapter_id` moves the page to another chapter.
#[derive(Debug, Default, Clone)]
pub struct UpdatePageParams {
    pub chapter_id: Option<String>,
    pub page_number: Option<i64>,
    pub image_url: Option<String>,
}
