use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};
use tvarr_core::{Episode, EpisodeStatus, ProviderKind, ProviderResult};
use tvarr_db::{Catalog, DbError};
use tvarr_naming::{NameParser, ParseResult, sanitize_scene_name};
use tvarr_providers::{ProviderError, ProviderRegistry};

use crate::resolver::{ResolveError, Resolution, ShowResolver};
use crate::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no episodes parsed from {0:?}")]
    NoEpisodes(String),
    #[error("no matching show: {0}")]
    NoMatchingShow(#[from] ResolveError),
    #[error("unknown episode {0}")]
    UnknownEpisode(String),
    #[error("unknown provider {0:?}")]
    UnknownProvider(String),
    #[error("payload download failed: {0}")]
    Fetch(#[from] ProviderError),
    #[error("payload save failed: {0}")]
    Save(#[from] StorageError),
    #[error("catalog error: {0}")]
    Db(#[from] DbError),
}

/// What happened to a release that matched a catalog episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Snatched { episode_id: i64, path: PathBuf },
    /// The episode was not wanted, so nothing was downloaded.
    Skipped {
        episode_id: i64,
        status: EpisodeStatus,
    },
}

/// Destination directory per payload kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blackholes {
    pub nzb: PathBuf,
    pub torrent: PathBuf,
}

impl Blackholes {
    pub fn for_kind(&self, kind: ProviderKind) -> &Path {
        match kind {
            ProviderKind::Nzb => &self.nzb,
            ProviderKind::Torrent => &self.torrent,
        }
    }
}

/// One async lock per episode id. Entries nobody holds or waits on are
/// pruned on the next acquisition.
#[derive(Debug, Default)]
pub struct EpisodeLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl EpisodeLocks {
    pub async fn lock(&self, episode_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.retain(|_, l| Arc::strong_count(l) > 1);
            map.entry(episode_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Turns provider results into snatched episodes.
pub struct Reconciler {
    catalog: Arc<dyn Catalog>,
    resolver: ShowResolver,
    providers: ProviderRegistry,
    storage: Arc<dyn Storage>,
    blackholes: Blackholes,
    payload_timeout: Duration,
    locks: EpisodeLocks,
}

impl Reconciler {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        providers: ProviderRegistry,
        storage: Arc<dyn Storage>,
        blackholes: Blackholes,
    ) -> Self {
        Self {
            resolver: ShowResolver::new(catalog.clone()),
            catalog,
            providers,
            storage,
            blackholes,
            payload_timeout: Duration::from_secs(120),
            locks: EpisodeLocks::default(),
        }
    }

    pub fn with_payload_timeout(mut self, timeout: Duration) -> Self {
        self.payload_timeout = timeout;
        self
    }

    /// Match one result against the catalog and snatch it if its episode is
    /// wanted.
    ///
    /// Concurrent calls for the same episode are serialized; the status is
    /// re-read under the lock and committed with a compare-and-set against
    /// `Wanted`, so one result at most moves the episode to `Snatched`.
    pub async fn process(&self, result: &ProviderResult) -> Result<Outcome, ReconcileError> {
        let parser = if result.anime {
            NameParser::anime()
        } else {
            NameParser::standard()
        };
        let parsed = parser.parse(&result.name);
        if !parsed.has_episodes() {
            return Err(ReconcileError::NoEpisodes(result.name.clone()));
        }

        let series = parsed.series_name.as_deref().unwrap_or_default();
        let Resolution {
            show,
            season_override,
        } = self.resolver.resolve(series).await?;
        let season = season_override.or(parsed.season_number).unwrap_or(1);

        let unknown = || ReconcileError::UnknownEpisode(describe(&show.name, season, &parsed));
        let episode = find_episode(self.catalog.as_ref(), show.id, season, &parsed)
            .await?
            .ok_or_else(unknown)?;
        if episode.status != EpisodeStatus::Wanted {
            return Ok(skipped(&episode));
        }

        let _guard = self.locks.lock(episode.id).await;
        let mut episode = self
            .catalog
            .get_episode(episode.id)
            .await?
            .ok_or_else(unknown)?;
        if episode.status != EpisodeStatus::Wanted {
            return Ok(skipped(&episode));
        }

        let provider = self
            .providers
            .get(&result.provider_name)
            .ok_or_else(|| ReconcileError::UnknownProvider(result.provider_name.clone()))?;
        let payload = tokio::time::timeout(self.payload_timeout, provider.fetch_payload(&result.url))
            .await
            .map_err(|_| ProviderError::Timeout)??;

        let filename = payload_filename(&result.name, payload.filename.as_deref(), provider.kind());
        let dir = self.blackholes.for_kind(provider.kind());
        let path = self
            .storage
            .save_to_destination(dir, &filename, &payload.bytes)
            .await?;

        episode.status = EpisodeStatus::Snatched;
        episode.quality = parsed.quality;
        episode.release_name = Some(result.name.clone());
        if parsed.release_group.is_some() {
            episode.release_group = parsed.release_group.clone();
        }
        if !self
            .catalog
            .save_episode_if_status(EpisodeStatus::Wanted, &episode)
            .await?
        {
            let status = self
                .catalog
                .get_episode(episode.id)
                .await?
                .map_or(EpisodeStatus::Unknown, |e| e.status);
            warn!(
                episode_id = episode.id,
                status = %status,
                path = %path.display(),
                "episode changed status while its payload was saved"
            );
            return Ok(Outcome::Skipped {
                episode_id: episode.id,
                status,
            });
        }

        Ok(Outcome::Snatched {
            episode_id: episode.id,
            path,
        })
    }

    /// [`process`](Self::process), with the outcome logged instead of returned.
    pub async fn handle(&self, result: &ProviderResult) {
        match self.process(result).await {
            Ok(Outcome::Snatched { episode_id, path }) => info!(
                release = %result.name,
                provider = %result.provider_name,
                episode_id,
                path = %path.display(),
                "snatched"
            ),
            Ok(Outcome::Skipped { episode_id, status }) => debug!(
                release = %result.name,
                episode_id,
                status = %status,
                "episode not wanted"
            ),
            Err(e @ (ReconcileError::NoEpisodes(_) | ReconcileError::NoMatchingShow(_))) => {
                debug!(release = %result.name, error = %e, "dropping release")
            }
            Err(e @ ReconcileError::Db(_)) => {
                error!(release = %result.name, error = %e, "reconcile failed")
            }
            Err(e) => warn!(release = %result.name, error = %e, "dropping release"),
        }
    }
}

fn skipped(episode: &Episode) -> Outcome {
    Outcome::Skipped {
        episode_id: episode.id,
        status: episode.status,
    }
}

/// Look up the episode a parse points at: by season and first episode
/// number, or by first absolute number when only those were found.
pub(crate) async fn find_episode(
    catalog: &dyn Catalog,
    show_id: i64,
    season: i64,
    parsed: &ParseResult,
) -> Result<Option<Episode>, DbError> {
    if let Some(&number) = parsed.episode_numbers.first() {
        return catalog
            .get_episode_by_show_season_number(show_id, season, number)
            .await;
    }
    match parsed.absolute_episode_numbers.first() {
        Some(&absolute) => catalog.get_episode_by_absolute_number(show_id, absolute).await,
        None => Ok(None),
    }
}

fn describe(show: &str, season: i64, parsed: &ParseResult) -> String {
    match (
        parsed.episode_numbers.first(),
        parsed.absolute_episode_numbers.first(),
    ) {
        (Some(number), _) => format!("{show} S{season:02}E{number:02}"),
        (None, Some(absolute)) => format!("{show} #{absolute}"),
        (None, None) => show.to_string(),
    }
}

/// File name for a payload: the one the provider suggested, else the
/// release name in dotted scene form with the kind's extension.
pub fn payload_filename(release: &str, suggested: Option<&str>, kind: ProviderKind) -> String {
    if let Some(name) = suggested.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    let stem = sanitize_scene_name(release, false);
    if stem.is_empty() {
        return format!("release.{}", kind.extension());
    }
    format!("{stem}.{}", kind.extension())
}

// ─── Tests ───
