use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tvarr_core::{EpisodeStatus, Show};
use tvarr_naming::full_sanitize_scene_name;

use super::now_ts;
use crate::DbError;

const SHOW_COLUMNS: &str = "id, name, indexer, indexer_id, location, default_episode_status, \
     quality_group_id, anime, paused, last_indexer_update";

type ShowRow = (
    i64,
    String,
    String,
    i64,
    String,
    String,
    Option<i64>,
    bool,
    bool,
    Option<i64>,
);

fn show_from_row(r: ShowRow) -> Result<Show, DbError> {
    let default_episode_status = r
        .5
        .parse::<EpisodeStatus>()
        .map_err(|_| DbError::Corrupt(format!("show {} has status {:?}", r.0, r.5)))?;
    let last_indexer_update = r
        .9
        .map(|ts| {
            DateTime::<Utc>::from_timestamp(ts, 0)
                .ok_or_else(|| DbError::Corrupt(format!("show {} has timestamp {ts}", r.0)))
        })
        .transpose()?;

    Ok(Show {
        id: r.0,
        name: r.1,
        indexer: r.2,
        indexer_id: r.3,
        location: r.4,
        default_episode_status,
        quality_group_id: r.6,
        anime: r.7,
        paused: r.8,
        last_indexer_update,
    })
}

/// Exact, case-sensitive name lookup.
pub async fn get_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Show>, DbError> {
    let row: Option<ShowRow> =
        sqlx::query_as(&format!("SELECT {SHOW_COLUMNS} FROM tv_show WHERE name = ?"))
            .bind(name)
            .fetch_optional(pool)
            .await?;
    row.map(show_from_row).transpose()
}

/// Match against the sanitized form of each show's canonical name.
pub async fn get_by_scene_name(
    pool: &SqlitePool,
    scene_name: &str,
) -> Result<Option<Show>, DbError> {
    let row: Option<ShowRow> = sqlx::query_as(&format!(
        "SELECT {SHOW_COLUMNS} FROM tv_show WHERE scene_name = ? ORDER BY id LIMIT 1"
    ))
    .bind(full_sanitize_scene_name(scene_name))
    .fetch_optional(pool)
    .await?;
    row.map(show_from_row).transpose()
}

pub async fn get_by_indexer_and_id(
    pool: &SqlitePool,
    indexer: &str,
    indexer_id: i64,
) -> Result<Option<Show>, DbError> {
    let row: Option<ShowRow> = sqlx::query_as(&format!(
        "SELECT {SHOW_COLUMNS} FROM tv_show WHERE indexer = ? AND indexer_id = ?"
    ))
    .bind(indexer)
    .bind(indexer_id)
    .fetch_optional(pool)
    .await?;
    row.map(show_from_row).transpose()
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Show>, DbError> {
    let rows: Vec<ShowRow> =
        sqlx::query_as(&format!("SELECT {SHOW_COLUMNS} FROM tv_show ORDER BY name"))
            .fetch_all(pool)
            .await?;
    rows.into_iter().map(show_from_row).collect()
}

/// Insert a new show (`id == 0`) or update an existing one. A new show
/// whose `(indexer, indexer_id)` is already present updates that row.
/// Returns the row id.
pub async fn save(pool: &SqlitePool, show: &Show) -> Result<i64, DbError> {
    show.validate()?;
    let now = now_ts();
    let scene_name = full_sanitize_scene_name(&show.name);
    let status = show.default_episode_status.or_ignored().as_str();
    let last_update = show.last_indexer_update.map(|t| t.timestamp());

    if show.id == 0 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO tv_show (name, scene_name, indexer, indexer_id, location, \
             default_episode_status, quality_group_id, anime, paused, last_indexer_update, \
             created_ts, updated_ts) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(indexer, indexer_id) DO UPDATE SET \
             name = excluded.name, scene_name = excluded.scene_name, \
             location = excluded.location, \
             default_episode_status = excluded.default_episode_status, \
             quality_group_id = excluded.quality_group_id, anime = excluded.anime, \
             paused = excluded.paused, last_indexer_update = excluded.last_indexer_update, \
             updated_ts = excluded.updated_ts \
             RETURNING id",
        )
        .bind(&show.name)
        .bind(&scene_name)
        .bind(&show.indexer)
        .bind(show.indexer_id)
        .bind(&show.location)
        .bind(status)
        .bind(show.quality_group_id)
        .bind(show.anime)
        .bind(show.paused)
        .bind(last_update)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;
        return Ok(id);
    }

    let result = sqlx::query(
        "UPDATE tv_show SET name = ?, scene_name = ?, indexer = ?, indexer_id = ?, \
         location = ?, default_episode_status = ?, quality_group_id = ?, anime = ?, \
         paused = ?, last_indexer_update = ?, updated_ts = ? WHERE id = ?",
    )
    .bind(&show.name)
    .bind(&scene_name)
    .bind(&show.indexer)
    .bind(show.indexer_id)
    .bind(&show.location)
    .bind(status)
    .bind(show.quality_group_id)
    .bind(show.anime)
    .bind(show.paused)
    .bind(last_update)
    .bind(now)
    .bind(show.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::Missing("show", show.id));
    }
    Ok(show.id)
}
