use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tvarr_core::{Episode, EpisodeStatus, NameException, QualityGroup, SeasonException, Show};

use crate::repo::{episodes, exceptions, poll_history, quality_groups, shows};
use crate::{DbError, connect, migrate};

/// Persistent catalog of shows, episodes, aliases and poll bookkeeping.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for
/// store failures.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_show_by_name(&self, name: &str) -> Result<Option<Show>, DbError>;
    /// Compare the sanitized scene name of `name` against every show's.
    async fn get_show_by_scene_name(&self, name: &str) -> Result<Option<Show>, DbError>;
    async fn get_show_by_indexer_and_id(
        &self,
        indexer: &str,
        indexer_id: i64,
    ) -> Result<Option<Show>, DbError>;
    async fn get_show_and_season_from_exception(
        &self,
        name: &str,
    ) -> Result<Option<(Show, Option<i64>)>, DbError>;
    async fn get_show_from_name_exception(&self, name: &str) -> Result<Option<Show>, DbError>;
    async fn get_all_shows(&self) -> Result<Vec<Show>, DbError>;

    async fn get_episode(&self, id: i64) -> Result<Option<Episode>, DbError>;
    async fn get_episode_by_show_season_number(
        &self,
        show_id: i64,
        season: i64,
        episode: i64,
    ) -> Result<Option<Episode>, DbError>;
    async fn get_episode_by_absolute_number(
        &self,
        show_id: i64,
        absolute_number: i64,
    ) -> Result<Option<Episode>, DbError>;
    async fn get_show_episodes(&self, show_id: i64) -> Result<Vec<Episode>, DbError>;

    async fn save_show(&self, show: &Show) -> Result<i64, DbError>;
    async fn save_episode(&self, episode: &Episode) -> Result<i64, DbError>;
    async fn save_episodes(&self, episodes: &[Episode]) -> Result<Vec<i64>, DbError>;
    /// Compare-and-set on status: writes `episode` only while the stored row
    /// is still `expected`. Returns whether it was written.
    async fn save_episode_if_status(
        &self,
        expected: EpisodeStatus,
        episode: &Episode,
    ) -> Result<bool, DbError>;

    async fn save_name_exceptions(
        &self,
        source: &str,
        exceptions: &[NameException],
    ) -> Result<(), DbError>;
    async fn save_season_exceptions(
        &self,
        indexer: &str,
        exceptions: &[SeasonException],
    ) -> Result<(), DbError>;

    async fn get_last_poll_time(&self, name: &str) -> Result<Option<DateTime<Utc>>, DbError>;
    async fn set_last_poll_time(&self, name: &str) -> Result<(), DbError>;

    async fn get_quality_groups(&self) -> Result<Vec<QualityGroup>, DbError>;
    async fn get_quality_group(&self, id: i64) -> Result<Option<QualityGroup>, DbError>;
}

/// SQLite-backed [`Catalog`]. Reads go straight to the pool; writes are
/// serialized through a single lock.
pub struct SqliteCatalog {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Connect to `db_path` and bring the schema up to date.
    pub async fn open(db_path: &str) -> Result<Self, DbError> {
        let pool = connect(db_path).await?;
        migrate::run(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn get_show_by_name(&self, name: &str) -> Result<Option<Show>, DbError> {
        shows::get_by_name(&self.pool, name).await
    }

    async fn get_show_by_scene_name(&self, name: &str) -> Result<Option<Show>, DbError> {
        shows::get_by_scene_name(&self.pool, name).await
    }

    async fn get_show_by_indexer_and_id(
        &self,
        indexer: &str,
        indexer_id: i64,
    ) -> Result<Option<Show>, DbError> {
        shows::get_by_indexer_and_id(&self.pool, indexer, indexer_id).await
    }

    async fn get_show_and_season_from_exception(
        &self,
        name: &str,
    ) -> Result<Option<(Show, Option<i64>)>, DbError> {
        exceptions::show_and_season_for_exception(&self.pool, name).await
    }

    async fn get_show_from_name_exception(&self, name: &str) -> Result<Option<Show>, DbError> {
        exceptions::show_for_name_exception(&self.pool, name).await
    }

    async fn get_all_shows(&self) -> Result<Vec<Show>, DbError> {
        shows::list(&self.pool).await
    }

    async fn get_episode(&self, id: i64) -> Result<Option<Episode>, DbError> {
        episodes::get(&self.pool, id).await
    }

    async fn get_episode_by_show_season_number(
        &self,
        show_id: i64,
        season: i64,
        episode: i64,
    ) -> Result<Option<Episode>, DbError> {
        episodes::get_by_show_season_number(&self.pool, show_id, season, episode).await
    }

    async fn get_episode_by_absolute_number(
        &self,
        show_id: i64,
        absolute_number: i64,
    ) -> Result<Option<Episode>, DbError> {
        episodes::get_by_absolute_number(&self.pool, show_id, absolute_number).await
    }

    async fn get_show_episodes(&self, show_id: i64) -> Result<Vec<Episode>, DbError> {
        episodes::list_for_show(&self.pool, show_id).await
    }

    async fn save_show(&self, show: &Show) -> Result<i64, DbError> {
        let _guard = self.write_lock.lock().await;
        if show.quality_group_id.is_some() {
            return shows::save(&self.pool, show).await;
        }
        let mut show = show.clone();
        show.quality_group_id = quality_groups::get_default(&self.pool)
            .await?
            .map(|g| g.id);
        shows::save(&self.pool, &show).await
    }

    async fn save_episode(&self, episode: &Episode) -> Result<i64, DbError> {
        let _guard = self.write_lock.lock().await;
        episodes::save(&self.pool, episode).await
    }

    async fn save_episodes(&self, episodes: &[Episode]) -> Result<Vec<i64>, DbError> {
        let _guard = self.write_lock.lock().await;
        episodes::save_many(&self.pool, episodes).await
    }

    async fn save_episode_if_status(
        &self,
        expected: EpisodeStatus,
        episode: &Episode,
    ) -> Result<bool, DbError> {
        let _guard = self.write_lock.lock().await;
        episodes::save_if_status(&self.pool, expected, episode).await
    }

    async fn save_name_exceptions(
        &self,
        source: &str,
        list: &[NameException],
    ) -> Result<(), DbError> {
        let _guard = self.write_lock.lock().await;
        exceptions::replace_name_exceptions(&self.pool, source, list).await
    }

    async fn save_season_exceptions(
        &self,
        indexer: &str,
        list: &[SeasonException],
    ) -> Result<(), DbError> {
        let _guard = self.write_lock.lock().await;
        exceptions::replace_season_exceptions(&self.pool, indexer, list).await
    }

    async fn get_last_poll_time(&self, name: &str) -> Result<Option<DateTime<Utc>>, DbError> {
        poll_history::get_last(&self.pool, name).await
    }

    async fn set_last_poll_time(&self, name: &str) -> Result<(), DbError> {
        let _guard = self.write_lock.lock().await;
        poll_history::set_last(&self.pool, name, Utc::now()).await
    }

    async fn get_quality_groups(&self) -> Result<Vec<QualityGroup>, DbError> {
        quality_groups::list(&self.pool).await
    }

    async fn get_quality_group(&self, id: i64) -> Result<Option<QualityGroup>, DbError> {
        quality_groups::get(&self.pool, id).await
    }
}
