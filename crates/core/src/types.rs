use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::quality::Quality;

/// Acquisition state of an episode, stored in the `episode.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    #[default]
    Unknown,
    Unaired,
    Snatched,
    Wanted,
    Downloaded,
    Skipped,
    Archived,
    Ignored,
    SnatchedProper,
    Subtitled,
    Failed,
    SnatchedBest,
}

impl EpisodeStatus {
    pub const ALL: [EpisodeStatus; 12] = [
        Self::Unknown,
        Self::Unaired,
        Self::Snatched,
        Self::Wanted,
        Self::Downloaded,
        Self::Skipped,
        Self::Archived,
        Self::Ignored,
        Self::SnatchedProper,
        Self::Subtitled,
        Self::Failed,
        Self::SnatchedBest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Unaired => "unaired",
            Self::Snatched => "snatched",
            Self::Wanted => "wanted",
            Self::Downloaded => "downloaded",
            Self::Skipped => "skipped",
            Self::Archived => "archived",
            Self::Ignored => "ignored",
            Self::SnatchedProper => "snatched_proper",
            Self::Subtitled => "subtitled",
            Self::Failed => "failed",
            Self::SnatchedBest => "snatched_best",
        }
    }

    /// `Unknown` means "never set"; the catalog stores it as `Ignored`.
    pub fn or_ignored(self) -> Self {
        match self {
            Self::Unknown => Self::Ignored,
            other => other,
        }
    }
}

impl std::fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EpisodeStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownValue {
                kind: "episode status",
                value: s.to_string(),
            })
    }
}

/// Kind of payload a release provider hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Nzb,
    Torrent,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nzb => "nzb",
            Self::Torrent => "torrent",
        }
    }

    /// File extension used when a payload arrives without a name.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical catalog show. `id` is zero until the catalog assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub name: String,
    pub indexer: String,
    pub indexer_id: i64,
    pub location: String,
    pub default_episode_status: EpisodeStatus,
    pub quality_group_id: Option<i64>,
    pub anime: bool,
    pub paused: bool,
    pub last_indexer_update: Option<DateTime<Utc>>,
}

impl Show {
    pub fn new(name: impl Into<String>, indexer: impl Into<String>, indexer_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            indexer: indexer.into(),
            indexer_id,
            location: String::new(),
            default_episode_status: EpisodeStatus::Skipped,
            quality_group_id: None,
            anime: false,
            paused: false,
            last_indexer_update: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("show name"));
        }
        if self.indexer.is_empty() {
            return Err(ValidationError::EmptyField("indexer"));
        }
        if self.indexer_id == 0 {
            return Err(ValidationError::ZeroIndexerId);
        }
        Ok(())
    }
}

/// One episode of a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub show_id: i64,
    pub name: String,
    pub season: i64,
    pub episode: i64,
    pub absolute_number: Option<i64>,
    pub air_date: Option<NaiveDate>,
    pub status: EpisodeStatus,
    pub quality: Quality,
    pub location: Option<String>,
    pub file_size: Option<i64>,
    pub release_name: Option<String>,
    pub release_group: Option<String>,
}

impl Episode {
    pub fn new(show_id: i64, season: i64, episode: i64) -> Self {
        Self {
            id: 0,
            show_id,
            name: String::new(),
            season,
            episode,
            absolute_number: None,
            air_date: None,
            status: EpisodeStatus::Unknown,
            quality: Quality::Unknown,
            location: None,
            file_size: None,
            release_name: None,
            release_group: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.show_id == 0 {
            return Err(ValidationError::MissingShowId);
        }
        if self.episode == 0 {
            return Err(ValidationError::ZeroEpisodeNumber);
        }
        Ok(())
    }
}

/// An alternate show name attributed to an alias feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameException {
    pub source: String,
    pub indexer: String,
    pub indexer_id: i64,
    pub name: String,
}

impl NameException {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source.is_empty() {
            return Err(ValidationError::EmptyField("source"));
        }
        if self.indexer.is_empty() {
            return Err(ValidationError::EmptyField("indexer"));
        }
        if self.indexer_id == 0 {
            return Err(ValidationError::ZeroIndexerId);
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        Ok(())
    }
}

/// An alternate name that also pins the season it refers to. A negative
/// season applies to the whole show and carries no override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonException {
    pub indexer: String,
    pub indexer_id: i64,
    pub name: String,
    pub season: i64,
}

impl SeasonException {
    pub fn season_override(&self) -> Option<i64> {
        (self.season >= 0).then_some(self.season)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.indexer.is_empty() {
            return Err(ValidationError::EmptyField("indexer"));
        }
        if self.indexer_id == 0 {
            return Err(ValidationError::ZeroIndexerId);
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        Ok(())
    }
}

/// One candidate release announced by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub name: String,
    pub url: String,
    pub size: u64,
    pub published: Option<DateTime<Utc>>,
    pub provider_name: String,
    pub kind: ProviderKind,
    pub anime: bool,
}
