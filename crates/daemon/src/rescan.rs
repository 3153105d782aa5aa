use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};
use tvarr_core::{EpisodeStatus, Show};
use tvarr_db::{Catalog, DbError};
use tvarr_naming::walk::media_files_in_dir;
use tvarr_naming::{NameParser, RuleSet};

use crate::reconcile::find_episode;

#[derive(Debug, Error)]
pub enum RescanError {
    #[error("show {0:?} has no location")]
    NoLocation(String),
    #[error("walk task failed: {0}")]
    Walk(#[from] tokio::task::JoinError),
    #[error("catalog error: {0}")]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanSummary {
    pub files: usize,
    /// Episodes marked downloaded.
    pub matched: usize,
    pub unmatched: usize,
}

/// Walk a show's location and mark every episode found on disk as
/// downloaded, recording its path, size and quality.
pub async fn rescan_show(catalog: &dyn Catalog, show: &Show) -> Result<RescanSummary, RescanError> {
    if show.location.trim().is_empty() {
        return Err(RescanError::NoLocation(show.name.clone()));
    }
    let root = PathBuf::from(&show.location);
    let files = tokio::task::spawn_blocking(move || media_files_in_dir(&root)).await?;

    let parser = NameParser::new(RuleSet::All);
    let mut summary = RescanSummary {
        files: files.len(),
        ..Default::default()
    };
    let mut found = Vec::new();

    for file in files {
        let path = file.path.to_string_lossy().into_owned();
        let parsed = parser.parse(&path);
        if !parsed.has_episodes() {
            debug!(path = %path, "no episode numbers in file name");
            summary.unmatched += 1;
            continue;
        }

        let season = parsed.season_number.unwrap_or(1);
        let Some(mut episode) = find_episode(catalog, show.id, season, &parsed).await? else {
            debug!(path = %path, season, "file matches no catalog episode");
            summary.unmatched += 1;
            continue;
        };

        episode.location = Some(path.clone());
        episode.file_size = i64::try_from(file.size_bytes).ok();
        episode.quality = parsed.quality;
        episode.status = EpisodeStatus::Downloaded;
        if let Some(name) = file.path.file_name() {
            episode.release_name = Some(name.to_string_lossy().into_owned());
        }
        found.push(episode);
    }

    catalog.save_episodes(&found).await?;
    summary.matched = found.len();
    info!(
        show = %show.name,
        files = summary.files,
        matched = summary.matched,
        unmatched = summary.unmatched,
        "rescan complete"
    );
    Ok(summary)
}
