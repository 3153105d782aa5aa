pub mod catalog;
pub mod migrate;
pub mod repo;

pub use catalog::{Catalog, SqliteCatalog};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tvarr_core::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),
    #[error("corrupt stored value: {0}")]
    Corrupt(String),
    #[error("{0} {1} does not exist")]
    Missing(&'static str, i64),
}

fn is_memory(db_path: &str) -> bool {
    db_path == ":memory:" || db_path == "sqlite::memory:"
}

/// Create a SQLite connection pool. File databases use WAL mode; an
/// in-memory database is served by one connection that is never recycled,
/// since closing it would drop the data.
pub async fn connect(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if is_memory(db_path) {
        let opts = SqliteConnectOptions::from_str(db_path)?.foreign_keys(true);
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await;
    }

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let opts = SqliteConnectOptions::from_str(db_path)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
}
