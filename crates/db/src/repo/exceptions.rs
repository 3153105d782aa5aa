use sqlx::SqlitePool;
use tvarr_core::{NameException, SeasonException, Show, ValidationError};
use tvarr_naming::full_sanitize_scene_name;

use super::{now_ts, shows};
use crate::DbError;

/// Atomically replace every name exception contributed by `source`.
pub async fn replace_name_exceptions(
    pool: &SqlitePool,
    source: &str,
    exceptions: &[NameException],
) -> Result<(), DbError> {
    for exception in exceptions {
        exception.validate()?;
    }

    let now = now_ts();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM name_exception WHERE source = ?")
        .bind(source)
        .execute(&mut *tx)
        .await?;

    for exception in exceptions {
        sqlx::query(
            "INSERT INTO name_exception (source, indexer, indexer_id, name, scene_name, created_ts) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(source)
        .bind(&exception.indexer)
        .bind(exception.indexer_id)
        .bind(&exception.name)
        .bind(full_sanitize_scene_name(&exception.name))
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Show whose name exception sanitizes to the same scene name as `name`.
pub async fn show_for_name_exception(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<Show>, DbError> {
    let row: Option<(String, i64)> = sqlx::query_as(
        "SELECT ne.indexer, ne.indexer_id FROM name_exception ne \
         JOIN tv_show s ON s.indexer = ne.indexer AND s.indexer_id = ne.indexer_id \
         WHERE ne.scene_name = ? ORDER BY ne.id LIMIT 1",
    )
    .bind(full_sanitize_scene_name(name))
    .fetch_optional(pool)
    .await?;

    match row {
        Some((indexer, indexer_id)) => shows::get_by_indexer_and_id(pool, &indexer, indexer_id).await,
        None => Ok(None),
    }
}

/// Atomically replace every season exception for `indexer`.
pub async fn replace_season_exceptions(
    pool: &SqlitePool,
    indexer: &str,
    exceptions: &[SeasonException],
) -> Result<(), DbError> {
    for exception in exceptions {
        exception.validate()?;
        if exception.indexer != indexer {
            return Err(ValidationError::IndexerMismatch {
                expected: indexer.to_string(),
                found: exception.indexer.clone(),
            }
            .into());
        }
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM season_exception WHERE indexer = ?")
        .bind(indexer)
        .execute(&mut *tx)
        .await?;

    for exception in exceptions {
        sqlx::query(
            "INSERT INTO season_exception (indexer, indexer_id, name, season) VALUES (?, ?, ?, ?)",
        )
        .bind(indexer)
        .bind(exception.indexer_id)
        .bind(&exception.name)
        .bind(exception.season)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Case-insensitive season-exception lookup. The season is `None` when the
/// exception covers the whole show.
pub async fn show_and_season_for_exception(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<(Show, Option<i64>)>, DbError> {
    let row: Option<(String, i64, String, i64)> = sqlx::query_as(
        "SELECT se.indexer, se.indexer_id, se.name, se.season FROM season_exception se \
         JOIN tv_show s ON s.indexer = se.indexer AND s.indexer_id = se.indexer_id \
         WHERE se.name = ? ORDER BY se.id LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    let Some((indexer, indexer_id, name, season)) = row else {
        return Ok(None);
    };
    let exception = SeasonException {
        indexer,
        indexer_id,
        name,
        season,
    };
    let show = shows::get_by_indexer_and_id(pool, &exception.indexer, exception.indexer_id).await?;
    Ok(show.map(|s| (s, exception.season_override())))
}
