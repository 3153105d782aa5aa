pub mod exceptions;
pub mod http;

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tvarr_core::{Episode, ProviderKind, ProviderResult, Show};

pub use exceptions::{ExceptionBatch, ExceptionFeed};
pub use http::HttpClient;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not found")]
    NotFound,
    #[error("timed out")]
    Timeout,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if let Some(status) = e.status() {
            ProviderError::Status(status.as_u16())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

/// Downloaded release payload. `filename` is whatever the source
/// suggested, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// A source of release candidates (an NZB indexer or torrent tracker feed).
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Latest releases announced by the source.
    async fn fetch_new_items(&self) -> Result<Vec<ProviderResult>, ProviderError>;

    /// Download the payload a result points at.
    async fn fetch_payload(&self, url: &str) -> Result<Payload, ProviderError>;
}

/// A canonical show and episode metadata source.
#[async_trait::async_trait]
pub trait Indexer: Send + Sync {
    fn name(&self) -> &str;

    async fn search_by_term(&self, term: &str) -> Result<Vec<Show>, ProviderError>;

    async fn get_show_by_id(&self, indexer_id: i64) -> Result<Show, ProviderError>;

    /// Refresh `show` and its episode list in place. New episodes are
    /// appended with `id == 0`.
    async fn update_show(
        &self,
        show: &mut Show,
        episodes: &mut Vec<Episode>,
    ) -> Result<(), ProviderError>;
}

pub type ProviderRegistry = HashMap<String, Arc<dyn Provider>>;
pub type IndexerRegistry = HashMap<String, Arc<dyn Indexer>>;

/// Key providers by their name. A later provider with a duplicate name
/// replaces the earlier one.
pub fn provider_registry(
    providers: impl IntoIterator<Item = Arc<dyn Provider>>,
) -> ProviderRegistry {
    providers
        .into_iter()
        .map(|p| (p.name().to_string(), p))
        .collect()
}

pub fn indexer_registry(indexers: impl IntoIterator<Item = Arc<dyn Indexer>>) -> IndexerRegistry {
    indexers
        .into_iter()
        .map(|i| (i.name().to_string(), i))
        .collect()
}
