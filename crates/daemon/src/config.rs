use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("{var} must be one of {expected}, got {value:?}")]
    InvalidChoice {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("invalid alias feed {0:?}, expected <scene|xem>:<indexer>:<url>")]
    InvalidFeed(String),
}

/// Wire format of an alias feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    SceneList,
    Xem,
}

impl FeedFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SceneList => "scene",
            Self::Xem => "xem",
        }
    }
}

/// How release pollers hand results to reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Through the bounded result queue and its consumer.
    #[default]
    Queue,
    /// Inline, inside the poller.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub format: FeedFormat,
    pub indexer: String,
    pub url: String,
}

impl FeedConfig {
    /// Poll-history key and name-exception source.
    pub fn name(&self) -> String {
        format!("{}_{}", self.format.as_str(), self.indexer)
    }

    /// Parse `scene:tvdb:https://...`. The URL keeps its own colons.
    pub fn parse(entry: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidFeed(entry.to_string());
        let mut parts = entry.trim().splitn(3, ':');
        let format = match parts.next() {
            Some("scene") => FeedFormat::SceneList,
            Some("xem") => FeedFormat::Xem,
            _ => return Err(invalid()),
        };
        let indexer = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let url = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        Ok(Self {
            format,
            indexer: indexer.to_string(),
            url: url.to_string(),
        })
    }
}

const DEFAULT_FEED: &str =
    "scene:tvdb:https://midgetspy.github.io/sb_tvdb_scene_exceptions/exceptions.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub db_path: String,
    pub nzb_blackhole: PathBuf,
    pub torrent_blackhole: PathBuf,
    pub poll_interval: Duration,
    pub poll_jitter: Duration,
    pub fetch_timeout: Duration,
    pub payload_timeout: Duration,
    pub dispatch: DispatchMode,
    pub result_queue: usize,
    pub max_reconciles: usize,
    pub show_refresh_interval: Duration,
    pub show_max_age: Duration,
    pub exception_poll_interval: Duration,
    pub exception_jitter: Duration,
    pub exception_feeds: Vec<FeedConfig>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            db_path: "tvarr.db".to_string(),
            nzb_blackhole: PathBuf::from("blackhole/nzb"),
            torrent_blackhole: PathBuf::from("blackhole/torrent"),
            poll_interval: Duration::from_secs(15 * 60),
            poll_jitter: Duration::ZERO,
            fetch_timeout: Duration::from_secs(60),
            payload_timeout: Duration::from_secs(120),
            dispatch: DispatchMode::Queue,
            result_queue: 64,
            max_reconciles: 4,
            show_refresh_interval: Duration::from_secs(15 * 60),
            show_max_age: Duration::from_secs(24 * 60 * 60),
            exception_poll_interval: Duration::from_secs(24 * 60 * 60),
            exception_jitter: Duration::from_secs(60),
            exception_feeds: FeedConfig::parse(DEFAULT_FEED).into_iter().collect(),
        }
    }
}

impl DaemonConfig {
    /// Read `TVARR_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(v) = lookup("TVARR_DB") {
            cfg.db_path = v;
        }
        if let Some(v) = lookup("TVARR_NZB_BLACKHOLE") {
            cfg.nzb_blackhole = v.into();
        }
        if let Some(v) = lookup("TVARR_TORRENT_BLACKHOLE") {
            cfg.torrent_blackhole = v.into();
        }

        let secs = |var: &'static str, current: Duration| -> Result<Duration, ConfigError> {
            Ok(number(&lookup, var)?.map_or(current, Duration::from_secs))
        };
        cfg.poll_interval = secs("TVARR_POLL_INTERVAL_SECS", cfg.poll_interval)?;
        cfg.poll_jitter = secs("TVARR_POLL_JITTER_SECS", cfg.poll_jitter)?;
        cfg.fetch_timeout = secs("TVARR_FETCH_TIMEOUT_SECS", cfg.fetch_timeout)?;
        cfg.payload_timeout = secs("TVARR_PAYLOAD_TIMEOUT_SECS", cfg.payload_timeout)?;
        cfg.show_refresh_interval = secs("TVARR_SHOW_REFRESH_SECS", cfg.show_refresh_interval)?;
        cfg.show_max_age = secs("TVARR_SHOW_MAX_AGE_SECS", cfg.show_max_age)?;
        cfg.exception_poll_interval =
            secs("TVARR_EXCEPTION_POLL_SECS", cfg.exception_poll_interval)?;
        cfg.exception_jitter = secs("TVARR_EXCEPTION_JITTER_SECS", cfg.exception_jitter)?;

        if let Some(v) = lookup("TVARR_DISPATCH") {
            cfg.dispatch = match v.trim() {
                "queue" => DispatchMode::Queue,
                "direct" => DispatchMode::Direct,
                other => {
                    return Err(ConfigError::InvalidChoice {
                        var: "TVARR_DISPATCH",
                        expected: "queue, direct",
                        value: other.to_string(),
                    });
                }
            };
        }
        if let Some(n) = number(&lookup, "TVARR_RESULT_QUEUE")? {
            cfg.result_queue = positive("TVARR_RESULT_QUEUE", n)?;
        }
        if let Some(n) = number(&lookup, "TVARR_MAX_RECONCILES")? {
            cfg.max_reconciles = positive("TVARR_MAX_RECONCILES", n)?;
        }
        for (var, d) in [
            ("TVARR_POLL_INTERVAL_SECS", cfg.poll_interval),
            ("TVARR_FETCH_TIMEOUT_SECS", cfg.fetch_timeout),
            ("TVARR_PAYLOAD_TIMEOUT_SECS", cfg.payload_timeout),
            ("TVARR_SHOW_REFRESH_SECS", cfg.show_refresh_interval),
            ("TVARR_EXCEPTION_POLL_SECS", cfg.exception_poll_interval),
        ] {
            if d.is_zero() {
                return Err(ConfigError::Zero(var));
            }
        }

        // An empty value disables every alias feed.
        if let Some(v) = lookup("TVARR_EXCEPTION_FEEDS") {
            cfg.exception_feeds = v
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(FeedConfig::parse)
                .collect::<Result<_, _>>()?;
        }

        Ok(cfg)
    }
}

fn number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    lookup(var)
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber { var, value: v })
        })
        .transpose()
}

fn positive(var: &'static str, n: u64) -> Result<usize, ConfigError> {
    match usize::try_from(n) {
        Ok(0) => Err(ConfigError::Zero(var)),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::InvalidNumber {
            var,
            value: n.to_string(),
        }),
    }
}

// ─── Tests ───
