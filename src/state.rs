use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::store::json::JsonStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub fallback: Arc<JsonStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        if let Some(dir) = sqlite_parent(&config.database_url) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create {}", dir.display()))?;
        }
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("open database")?;

        let fallback = Arc::new(JsonStore::new(&config.fallback_store_path));

        Ok(Self {
            db,
            fallback,
            config,
        })
    }

    pub fn from_parts(db: SqlitePool, fallback: Arc<JsonStore>, config: Arc<AppConfig>) -> Self {
        Self {
            db,
            fallback,
            config,
        }
    }
}

/// Directory holding a file-backed sqlite database, if the URL names one.
fn sqlite_parent(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}
