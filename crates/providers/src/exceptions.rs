//! Alias feeds: alternate show names published by the scene and XEM.

use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::warn;
use tvarr_core::{NameException, SeasonException};

use crate::{HttpClient, ProviderError};

/// One fetch worth of aliases, replacing whatever the feed supplied before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionBatch {
    Names {
        source: String,
        exceptions: Vec<NameException>,
    },
    Seasons {
        indexer: String,
        exceptions: Vec<SeasonException>,
    },
}

impl ExceptionBatch {
    pub fn len(&self) -> usize {
        match self {
            Self::Names { exceptions, .. } => exceptions.len(),
            Self::Seasons { exceptions, .. } => exceptions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
pub trait ExceptionFeed: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<ExceptionBatch, ProviderError>;
}

static RE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'((?:\\'|[^'])*)'").unwrap());

/// Parse a scene exception list: one show per line, in the form
/// `12345: 'Alias One', 'Alias Two',`. Malformed lines and aliases the
/// catalog would reject are skipped, so one bad entry cannot block the rest.
pub fn parse_exception_list(source: &str, indexer: &str, text: &str) -> Vec<NameException> {
    let mut out = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((id, aliases)) = line.split_once(':') else {
            continue;
        };
        let Ok(indexer_id) = id.trim().parse::<i64>() else {
            warn!(source, line, "skipping exception line without a numeric id");
            continue;
        };
        for cap in RE_QUOTED.captures_iter(aliases) {
            let name = cap[1].replace("\\'", "'");
            if name.trim().is_empty() {
                continue;
            }
            let exception = NameException {
                source: source.to_string(),
                indexer: indexer.to_string(),
                indexer_id,
                name,
            };
            if let Err(e) = exception.validate() {
                warn!(source, line, error = %e, "skipping invalid name exception");
                continue;
            }
            out.push(exception);
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct XemNames {
    #[serde(default)]
    data: BTreeMap<String, Vec<HashMap<String, i64>>>,
}

/// Parse an XEM name map, `{"data": {"12345": [{"Alias": 2}, {"Other": -1}]}}`.
/// Entries the catalog would reject are skipped.
pub fn parse_xem_names(indexer: &str, json: &str) -> Result<Vec<SeasonException>, ProviderError> {
    let parsed: XemNames =
        serde_json::from_str(json).map_err(|e| ProviderError::Parse(format!("XEM names: {e}")))?;

    let mut out = Vec::new();
    for (id, entries) in parsed.data {
        let Ok(indexer_id) = id.parse::<i64>() else {
            warn!(indexer, id = %id, "skipping XEM entry without a numeric id");
            continue;
        };
        for entry in entries {
            let mut names: Vec<_> = entry.into_iter().collect();
            names.sort();
            for (name, season) in names {
                let exception = SeasonException {
                    indexer: indexer.to_string(),
                    indexer_id,
                    name,
                    season,
                };
                if let Err(e) = exception.validate() {
                    warn!(indexer, id = %id, error = %e, "skipping invalid XEM name");
                    continue;
                }
                out.push(exception);
            }
        }
    }
    Ok(out)
}

/// A scene exception list published over HTTP.
pub struct SceneExceptionList {
    name: String,
    url: String,
    indexer: String,
    http: HttpClient,
}

impl SceneExceptionList {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        indexer: impl Into<String>,
        http: HttpClient,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            indexer: indexer.into(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl ExceptionFeed for SceneExceptionList {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<ExceptionBatch, ProviderError> {
        let text = self.http.get_text(&self.url).await?;
        Ok(ExceptionBatch::Names {
            source: self.name.clone(),
            exceptions: parse_exception_list(&self.name, &self.indexer, &text),
        })
    }
}

/// An XEM `allNames` endpoint for one indexer.
pub struct XemNameMap {
    name: String,
    url: String,
    indexer: String,
    http: HttpClient,
}

impl XemNameMap {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        indexer: impl Into<String>,
        http: HttpClient,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            indexer: indexer.into(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl ExceptionFeed for XemNameMap {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<ExceptionBatch, ProviderError> {
        let json = self.http.get_text(&self.url).await?;
        Ok(ExceptionBatch::Seasons {
            indexer: self.indexer.clone(),
            exceptions: parse_xem_names(&self.indexer, &json)?,
        })
    }
}
