use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "MANGA_SHELF_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Path to data directory (holds manga.db)
    #[arg(short, long, env = "MANGA_SHELF_DATA_DIR", default_value = "./data")]
    pub data_dir: String,

    /// SQLite URL, overrides --data-dir when set
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_flag() {
        let config = Config::try_parse_from(["manga_shelf", "-d", "/tmp/shelf"]).unwrap();
        assert_eq!(config.data_dir, "/tmp/shelf");
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "manga_shelf",
            "--port",
            "8080",
            "--database-url",
            "sqlite::memory:",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
    }
}
