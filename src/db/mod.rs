//! Database module for SQLite persistence.
//!
//! SQLite stands in for the hosted row store: the `trees` catalog table and
//! the `admin_users` credential table.

mod store;

pub use store::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trees (
            id TEXT PRIMARY KEY,
            scientific_name TEXT NOT NULL,
            family TEXT NOT NULL,
            common_name_english TEXT NOT NULL DEFAULT '',
            common_name_malayalam TEXT,
            native_range TEXT,
            location TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            added_date TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admin_users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_trees_scientific_name ON trees(scientific_name);
        CREATE INDEX IF NOT EXISTS idx_trees_location ON trees(location);
        CREATE INDEX IF NOT EXISTS idx_trees_family ON trees(family);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
