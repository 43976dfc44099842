//! Database connection management

use anyhow::{Context, Result};
use shopchat_config::DatabaseConfig;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Prepare and establish a database connection
pub async fn prepare_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    ensure_sqlite_path(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .with_context(|| format!("failed to connect to database {}", config.url))?;

    // Enable foreign keys for SQLite
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("failed to enable foreign keys for sqlite")?;

    // Enable WAL mode for better performance
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .context("failed to enable WAL mode for sqlite")?;

    // Set busy timeout to prevent database locked errors
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await
        .context("failed to set busy timeout for sqlite")?;

    info!(url = %config.url, "database connection established");
    Ok(pool)
}

/// Ensure the SQLite database file and directory exist
async fn ensure_sqlite_path(url: &str) -> Result<()> {
    let Some(sqlite_path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };

    if sqlite_path == ":memory:" {
        return Ok(());
    }

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create sqlite directory {}", parent.display())
            })?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .await
            .with_context(|| format!("failed to create sqlite database file {}", path.display()))?;
    }

    Ok(())
}
