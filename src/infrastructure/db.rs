use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::domain::KanbanError;

/// Opens (creating if needed) the snapshot database and applies the
/// embedded migrations. The replay binary and the persister share the pool,
/// so writers wait on the lock instead of failing with `SQLITE_BUSY`.
pub async fn init_db(database_url: &str) -> Result<SqlitePool, KanbanError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project_snapshots")
        .fetch_one(&pool)
        .await?;
    tracing::info!(database_url, stored_projects = stored, "Snapshot store ready");

    Ok(pool)
}

pub async fn journal_mode(pool: &SqlitePool) -> Result<String, KanbanError> {
    let mode: String = sqlx::query_scalar("PRAGMA journal_mode").fetch_one(pool).await?;
    Ok(mode)
}
