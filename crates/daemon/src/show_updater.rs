use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tvarr_core::{EpisodeStatus, Show};
use tvarr_db::Catalog;
use tvarr_providers::IndexerRegistry;

/// Periodically refreshes shows from their indexer.
pub struct ShowUpdater {
    catalog: Arc<dyn Catalog>,
    indexers: IndexerRegistry,
    interval: Duration,
    max_age: Duration,
    cancel: CancellationToken,
}

impl ShowUpdater {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        indexers: IndexerRegistry,
        interval: Duration,
        max_age: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            catalog,
            indexers,
            interval,
            max_age,
            cancel,
        }
    }

    pub async fn run(self) {
        loop {
            let refreshed = self.refresh_stale(Utc::now()).await;
            info!(refreshed, sleep_secs = self.interval.as_secs(), "show refresh pass done");
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("show updater stopping");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    fn is_stale(&self, show: &Show, now: DateTime<Utc>) -> bool {
        match show.last_indexer_update {
            None => true,
            Some(at) => (now - at).to_std().is_ok_and(|age| age > self.max_age),
        }
    }

    /// Refresh every show last updated more than `max_age` before `now`.
    /// Returns how many were saved; failures are logged per show.
    pub async fn refresh_stale(&self, now: DateTime<Utc>) -> usize {
        let shows = match self.catalog.get_all_shows().await {
            Ok(shows) => shows,
            Err(e) => {
                error!(error = %e, "cannot list shows");
                return 0;
            }
        };

        let mut refreshed = 0;
        for show in shows.into_iter().filter(|s| self.is_stale(s, now)) {
            let name = show.name.clone();
            match self.refresh(show, now).await {
                Ok(episodes) => {
                    info!(show = %name, episodes, "show refreshed");
                    refreshed += 1;
                }
                Err(e) => warn!(show = %name, error = %e, "show refresh failed"),
            }
        }
        refreshed
    }

    async fn refresh(&self, mut show: Show, now: DateTime<Utc>) -> anyhow::Result<usize> {
        let indexer = self
            .indexers
            .get(&show.indexer)
            .ok_or_else(|| anyhow::anyhow!("unknown indexer {:?}", show.indexer))?;

        let mut episodes = self.catalog.get_show_episodes(show.id).await?;
        indexer.update_show(&mut show, &mut episodes).await?;

        show.last_indexer_update = Some(now);
        self.catalog.save_show(&show).await?;

        for ep in episodes.iter_mut().filter(|e| e.id == 0) {
            ep.show_id = show.id;
            if ep.status == EpisodeStatus::Unknown {
                ep.status = show.default_episode_status;
            }
        }
        self.catalog.save_episodes(&episodes).await?;
        Ok(episodes.len())
    }
}
