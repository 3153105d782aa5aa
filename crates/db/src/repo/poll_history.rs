use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::DbError;

/// When `name` last completed a successful poll.
pub async fn get_last(pool: &SqlitePool, name: &str) -> Result<Option<DateTime<Utc>>, DbError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_polled_ts FROM poll_history WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    row.map(|(ts,)| {
        DateTime::<Utc>::from_timestamp(ts, 0)
            .ok_or_else(|| DbError::Corrupt(format!("poll time {ts} for {name}")))
    })
    .transpose()
}

pub async fn set_last(pool: &SqlitePool, name: &str, at: DateTime<Utc>) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO poll_history (name, last_polled_ts) VALUES (?, ?) \
         ON CONFLICT(name) DO UPDATE SET last_polled_ts = excluded.last_polled_ts",
    )
    .bind(name)
    .bind(at.timestamp())
    .execute(pool)
    .await?;
    Ok(())
}
