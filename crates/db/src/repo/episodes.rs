use chrono::NaiveDate;
use sqlx::{SqliteExecutor, SqlitePool};
use tvarr_core::{Episode, EpisodeStatus, Quality};

use super::now_ts;
use crate::DbError;

const EPISODE_COLUMNS: &str = "id, show_id, name, season, episode, absolute_number, air_date, \
     status, quality, location, file_size, release_name, release_group";

type EpisodeRow = (
    i64,
    i64,
    String,
    i64,
    i64,
    Option<i64>,
    Option<String>,
    String,
    i64,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
);

const AIR_DATE_FORMAT: &str = "%Y-%m-%d";

fn episode_from_row(r: EpisodeRow) -> Result<Episode, DbError> {
    let status = r
        .7
        .parse::<EpisodeStatus>()
        .map_err(|_| DbError::Corrupt(format!("episode {} has status {:?}", r.0, r.7)))?;
    let quality = Quality::from_value(r.8)
        .ok_or_else(|| DbError::Corrupt(format!("episode {} has quality {}", r.0, r.8)))?;
    let air_date = r
        .6
        .map(|d| {
            NaiveDate::parse_from_str(&d, AIR_DATE_FORMAT)
                .map_err(|_| DbError::Corrupt(format!("episode {} has air date {d:?}", r.0)))
        })
        .transpose()?;

    Ok(Episode {
        id: r.0,
        show_id: r.1,
        name: r.2,
        season: r.3,
        episode: r.4,
        absolute_number: r.5,
        air_date,
        status,
        quality,
        location: r.9,
        file_size: r.10,
        release_name: r.11,
        release_group: r.12,
    })
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Episode>, DbError> {
    let row: Option<EpisodeRow> =
        sqlx::query_as(&format!("SELECT {EPISODE_COLUMNS} FROM episode WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    row.map(episode_from_row).transpose()
}

pub async fn get_by_show_season_number(
    pool: &SqlitePool,
    show_id: i64,
    season: i64,
    episode: i64,
) -> Result<Option<Episode>, DbError> {
    let row: Option<EpisodeRow> = sqlx::query_as(&format!(
        "SELECT {EPISODE_COLUMNS} FROM episode WHERE show_id = ? AND season = ? AND episode = ?"
    ))
    .bind(show_id)
    .bind(season)
    .bind(episode)
    .fetch_optional(pool)
    .await?;
    row.map(episode_from_row).transpose()
}

pub async fn get_by_absolute_number(
    pool: &SqlitePool,
    show_id: i64,
    absolute_number: i64,
) -> Result<Option<Episode>, DbError> {
    let row: Option<EpisodeRow> = sqlx::query_as(&format!(
        "SELECT {EPISODE_COLUMNS} FROM episode WHERE show_id = ? AND absolute_number = ? \
         ORDER BY season, episode LIMIT 1"
    ))
    .bind(show_id)
    .bind(absolute_number)
    .fetch_optional(pool)
    .await?;
    row.map(episode_from_row).transpose()
}

/// All episodes of a show in season/episode order.
pub async fn list_for_show(pool: &SqlitePool, show_id: i64) -> Result<Vec<Episode>, DbError> {
    let rows: Vec<EpisodeRow> = sqlx::query_as(&format!(
        "SELECT {EPISODE_COLUMNS} FROM episode WHERE show_id = ? ORDER BY season, episode"
    ))
    .bind(show_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(episode_from_row).collect()
}

/// Insert (`id == 0`) or update one episode and return its id.
///
/// Inserting an episode whose (show, season, number) already exists only
/// refreshes its name, absolute number and air date; the existing row keeps
/// its acquisition state.
pub async fn save<'e, E>(exec: E, episode: &Episode) -> Result<i64, DbError>
where
    E: SqliteExecutor<'e>,
{
    episode.validate()?;
    let now = now_ts();
    let status = episode.status.or_ignored().as_str();
    let air_date = episode
        .air_date
        .map(|d| d.format(AIR_DATE_FORMAT).to_string());

    if episode.id == 0 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO episode (show_id, name, season, episode, absolute_number, air_date, \
             status, quality, location, file_size, release_name, release_group, updated_ts) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(show_id, season, episode) DO UPDATE SET \
             name = excluded.name, \
             absolute_number = COALESCE(excluded.absolute_number, absolute_number), \
             air_date = COALESCE(excluded.air_date, air_date), \
             updated_ts = excluded.updated_ts \
             RETURNING id",
        )
        .bind(episode.show_id)
        .bind(&episode.name)
        .bind(episode.season)
        .bind(episode.episode)
        .bind(episode.absolute_number)
        .bind(&air_date)
        .bind(status)
        .bind(episode.quality.value())
        .bind(&episode.location)
        .bind(episode.file_size)
        .bind(&episode.release_name)
        .bind(&episode.release_group)
        .bind(now)
        .fetch_one(exec)
        .await?;
        return Ok(id);
    }

    let result = sqlx::query(
        "UPDATE episode SET show_id = ?, name = ?, season = ?, episode = ?, \
         absolute_number = ?, air_date = ?, status = ?, quality = ?, location = ?, \
         file_size = ?, release_name = ?, release_group = ?, updated_ts = ? WHERE id = ?",
    )
    .bind(episode.show_id)
    .bind(&episode.name)
    .bind(episode.season)
    .bind(episode.episode)
    .bind(episode.absolute_number)
    .bind(&air_date)
    .bind(status)
    .bind(episode.quality.value())
    .bind(&episode.location)
    .bind(episode.file_size)
    .bind(&episode.release_name)
    .bind(&episode.release_group)
    .bind(now)
    .bind(episode.id)
    .execute(exec)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::Missing("episode", episode.id));
    }
    Ok(episode.id)
}

/// Save a batch of episodes in one transaction.
pub async fn save_many(pool: &SqlitePool, episodes: &[Episode]) -> Result<Vec<i64>, DbError> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(episodes.len());
    for episode in episodes {
        ids.push(save(&mut *tx, episode).await?);
    }
    tx.commit().await?;
    Ok(ids)
}

/// Write `episode` only if the stored row still has status `expected`.
/// Returns whether the row was written.
pub async fn save_if_status(
    pool: &SqlitePool,
    expected: EpisodeStatus,
    episode: &Episode,
) -> Result<bool, DbError> {
    episode.validate()?;
    let result = sqlx::query(
        "UPDATE episode SET name = ?, status = ?, quality = ?, location = ?, file_size = ?, \
         release_name = ?, release_group = ?, updated_ts = ? WHERE id = ? AND status = ?",
    )
    .bind(&episode.name)
    .bind(episode.status.or_ignored().as_str())
    .bind(episode.quality.value())
    .bind(&episode.location)
    .bind(episode.file_size)
    .bind(&episode.release_name)
    .bind(&episode.release_group)
    .bind(now_ts())
    .bind(episode.id)
    .bind(expected.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}
