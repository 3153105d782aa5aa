use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Discrete quality tier of a release. The numeric value is what gets
/// persisted, so it must never change for an existing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    Unknown,
    SdTv,
    SdDvd,
    HdTv,
    RawHdTv,
    FullHdTv,
    HdWebDl,
    FullHdWebDl,
    HdBluRay,
    FullHdBluRay,
}

impl Quality {
    /// Every tier, lowest first.
    pub const ALL: [Quality; 10] = [
        Self::Unknown,
        Self::SdTv,
        Self::SdDvd,
        Self::HdTv,
        Self::RawHdTv,
        Self::FullHdTv,
        Self::HdWebDl,
        Self::FullHdWebDl,
        Self::HdBluRay,
        Self::FullHdBluRay,
    ];

    /// Tiers from 720p HDTV upwards.
    pub const ALL_HD: [Quality; 7] = [
        Self::HdTv,
        Self::RawHdTv,
        Self::FullHdTv,
        Self::HdWebDl,
        Self::FullHdWebDl,
        Self::HdBluRay,
        Self::FullHdBluRay,
    ];

    pub fn value(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::SdTv => 10,
            Self::SdDvd => 100,
            Self::HdTv => 200,
            Self::RawHdTv => 300,
            Self::FullHdTv => 400,
            Self::HdWebDl => 500,
            Self::FullHdWebDl => 600,
            Self::HdBluRay => 700,
            Self::FullHdBluRay => 800,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.value() == value)
    }

    /// Human-readable label, also the token searched for in release names.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::SdTv => "SD TV",
            Self::SdDvd => "SD DVD",
            Self::HdTv => "HD TV",
            Self::RawHdTv => "RawHD TV",
            Self::FullHdTv => "1080p HD TV",
            Self::HdWebDl => "720p WEB-DL",
            Self::FullHdWebDl => "1080p WEB-DL",
            Self::HdBluRay => "720p BluRay",
            Self::FullHdBluRay => "1080p BluRay",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named set of acceptable quality tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityGroup {
    pub id: i64,
    pub name: String,
    pub qualities: Vec<Quality>,
    pub is_default: bool,
}

impl QualityGroup {
    pub fn new(name: impl Into<String>, qualities: &[Quality]) -> Self {
        Self {
            id: 0,
            name: name.into(),
            qualities: qualities.to_vec(),
            is_default: false,
        }
    }

    pub fn includes(&self, quality: Quality) -> bool {
        self.qualities.contains(&quality)
    }

    /// Comma-separated tier values, the persisted form.
    pub fn qualities_csv(&self) -> String {
        self.qualities
            .iter()
            .map(|q| q.value().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn parse_qualities_csv(csv: &str) -> Result<Vec<Quality>, ValidationError> {
        csv.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i64>()
                    .ok()
                    .and_then(Quality::from_value)
                    .ok_or_else(|| ValidationError::UnknownValue {
                        kind: "quality",
                        value: s.to_string(),
                    })
            })
            .collect()
    }

    /// The groups every fresh catalog starts with.
    pub fn defaults() -> Vec<QualityGroup> {
        let mut hd_all = QualityGroup::new(
            "HDALL",
            &[
                Quality::HdTv,
                Quality::HdWebDl,
                Quality::HdBluRay,
                Quality::FullHdWebDl,
                Quality::FullHdTv,
                Quality::FullHdBluRay,
            ],
        );
        hd_all.is_default = true;
        vec![
            hd_all,
            QualityGroup::new("SD", &[Quality::SdTv, Quality::SdDvd]),
            QualityGroup::new(
                "HD720p",
                &[Quality::HdWebDl, Quality::HdBluRay, Quality::HdTv],
            ),
            QualityGroup::new(
                "HD1080p",
                &[Quality::FullHdTv, Quality::FullHdWebDl, Quality::FullHdBluRay],
            ),
        ]
    }
}
