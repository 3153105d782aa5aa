use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};
use tvarr_core::Show;
use tvarr_db::{Catalog, DbError};
use tvarr_naming::full_sanitize_scene_name;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no show matches {0:?}")]
    NotFound(String),
}

/// A catalog show plus the season an alias pins, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub show: Show,
    pub season_override: Option<i64>,
}

impl Resolution {
    fn plain(show: Show) -> Self {
        Self {
            show,
            season_override: None,
        }
    }
}

/// Maps a parsed series name to a catalog show.
///
/// Tried in order: the exact show name, the season-exception table, the
/// name-exception table under the sanitized scene name, and finally the
/// sanitized names of the shows themselves. A store error at any step is
/// logged and treated like a miss.
#[derive(Clone)]
pub struct ShowResolver {
    catalog: Arc<dyn Catalog>,
}

impl ShowResolver {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    pub async fn resolve(&self, name: &str) -> Result<Resolution, ResolveError> {
        if name.trim().is_empty() {
            return Err(ResolveError::NotFound(name.to_string()));
        }

        if let Some(show) = found(name, "exact", self.catalog.get_show_by_name(name).await) {
            return Ok(Resolution::plain(show));
        }

        let by_season = self.catalog.get_show_and_season_from_exception(name).await;
        if let Some((show, season_override)) = found(name, "season exception", by_season) {
            return Ok(Resolution {
                show,
                season_override,
            });
        }

        let scene_name = full_sanitize_scene_name(name);
        if scene_name.is_empty() {
            return Err(ResolveError::NotFound(name.to_string()));
        }
        debug!(name, scene_name = %scene_name, "trying scene name");

        let by_alias = self.catalog.get_show_from_name_exception(&scene_name).await;
        if let Some(show) = found(name, "name exception", by_alias) {
            return Ok(Resolution::plain(show));
        }

        let by_scene = self.catalog.get_show_by_scene_name(&scene_name).await;
        if let Some(show) = found(name, "scene name", by_scene) {
            return Ok(Resolution::plain(show));
        }

        Err(ResolveError::NotFound(name.to_string()))
    }
}

fn found<T>(name: &str, step: &'static str, lookup: Result<Option<T>, DbError>) -> Option<T> {
    match lookup {
        Ok(Some(hit)) => {
            debug!(name, step, "show matched");
            Some(hit)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(name, step, error = %e, "show lookup failed, trying next step");
            None
        }
    }
}
