use chrono::NaiveDate;
use serde::Serialize;
use tracing::trace;
use tvarr_core::Quality;

use crate::dates::resolve_air_date;
use crate::media::strip_media_extension;
use crate::quality::classify_quality;
use crate::rules::{Captured, NameRule, RuleSet};

/// Best-effort result of parsing a release name or path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub original_name: String,
    pub series_name: Option<String>,
    pub series_num: Option<i64>,
    pub season_number: Option<i64>,
    /// First episode followed by any extra episodes of a multi-episode release.
    pub episode_numbers: Vec<i64>,
    pub absolute_episode_numbers: Vec<i64>,
    pub air_date: Option<NaiveDate>,
    pub extra_info: Option<String>,
    pub release_group: Option<String>,
    pub version: Option<String>,
    pub quality: Quality,
    pub score: i32,
    /// Name of the rule that produced the numbering.
    pub rule: Option<&'static str>,
}

impl ParseResult {
    fn unmatched(name: &str) -> Self {
        Self {
            original_name: name.to_string(),
            ..Default::default()
        }
    }

    /// True when nothing beyond the original string was recovered.
    pub fn is_empty(&self) -> bool {
        self.series_name.is_none()
            && self.season_number.is_none()
            && self.episode_numbers.is_empty()
            && self.absolute_episode_numbers.is_empty()
            && self.air_date.is_none()
    }

    pub fn has_episodes(&self) -> bool {
        !self.episode_numbers.is_empty() || !self.absolute_episode_numbers.is_empty()
    }
}

/// Field that can be missing in one decomposition and supplied by another.
trait Blank {
    fn is_blank(&self) -> bool;
}

impl<T> Blank for Option<T> {
    fn is_blank(&self) -> bool {
        self.is_none()
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NameParser {
    rule_set: RuleSet,
}

impl NameParser {
    pub fn new(rule_set: RuleSet) -> Self {
        Self { rule_set }
    }

    pub fn standard() -> Self {
        Self::new(RuleSet::Standard)
    }

    pub fn anime() -> Self {
        Self::new(RuleSet::Anime)
    }

    pub fn rule_set(&self) -> RuleSet {
        self.rule_set
    }

    /// Parse a path, merging what the full string, the file name and the
    /// parent directory each reveal.
    ///
    /// Numbering (air date, absolute numbers, season, episodes) comes from
    /// the file name first, then the directory. Text (series name, extra
    /// info, release group, version) comes from the directory first, then
    /// the file name. Quality is classified once over the full input.
    pub fn parse(&self, path: &str) -> ParseResult {
        let full = self.parse_string(path);

        let mut components = path.rsplit(['/', '\\']).filter(|c| !c.is_empty());
        let file = components
            .next()
            .map(|name| self.parse_string(strip_media_extension(name)))
            .unwrap_or_else(|| ParseResult::unmatched(path));
        let dir = components
            .next()
            .map(|name| self.parse_string(name))
            .unwrap_or_else(|| ParseResult::unmatched(""));

        let mut merged = ParseResult {
            original_name: path.to_string(),
            quality: classify_quality(path, self.rule_set == RuleSet::Anime),
            score: full.score,
            rule: full.rule,
            ..Default::default()
        };

        macro_rules! merge_field {
            ($field:ident, $first:ident, $second:ident) => {
                merged.$field = if $first.$field.is_blank() {
                    $second.$field.clone()
                } else {
                    $first.$field.clone()
                };
            };
        }

        merge_field!(air_date, file, dir);
        merge_field!(absolute_episode_numbers, file, dir);
        merge_field!(season_number, file, dir);
        merge_field!(episode_numbers, file, dir);
        merge_field!(series_num, file, dir);

        merge_field!(series_name, dir, file);
        merge_field!(extra_info, dir, file);
        merge_field!(release_group, dir, file);
        merge_field!(version, dir, file);

        merged
    }

    /// Run every active rule against one candidate string and keep the
    /// highest-scoring match. Earlier rules win ties.
    pub fn parse_string(&self, name: &str) -> ParseResult {
        let mut best: Option<ParseResult> = None;

        for (index, rule) in self.rule_set.rules().enumerate() {
            let Some(captured) = rule.capture(name) else {
                continue;
            };
            let Some(result) = build_result(name, rule, index, captured) else {
                trace!(rule = rule.name, name, "rule matched but numbers did not convert");
                continue;
            };
            trace!(rule = rule.name, score = result.score, "rule matched");
            if best.as_ref().is_none_or(|b| result.score > b.score) {
                best = Some(result);
            }
        }

        best.unwrap_or_else(|| ParseResult::unmatched(name))
    }
}

fn build_result(
    name: &str,
    rule: &'static NameRule,
    index: usize,
    captured: Captured,
) -> Option<ParseResult> {
    let mut score = -(index as i32);
    let mut add_if = |present: bool| {
        if present {
            score += 1;
        }
    };

    add_if(captured.series_name.is_some());
    add_if(captured.series_num.is_some());
    add_if(captured.season_num.is_some());
    add_if(captured.ep_num.is_some() || captured.ep_ab_num.is_some());
    add_if(captured.release_group.is_some());
    add_if(captured.air_date.is_some());

    let series_num = optional_number(captured.series_num.as_deref())?;
    let season_number = optional_number(captured.season_num.as_deref())?;

    let episode_numbers = captured
        .ep_num
        .iter()
        .chain(&captured.extra_ep_nums)
        .map(|n| parse_number(n))
        .collect::<Option<Vec<_>>>()?;
    let absolute_episode_numbers = captured
        .ep_ab_num
        .iter()
        .chain(&captured.extra_ab_ep_nums)
        .map(|n| parse_number(n))
        .collect::<Option<Vec<_>>>()?;

    let air_date = match captured.air_date.as_deref() {
        Some(text) => Some(resolve_air_date(text)?),
        None => None,
    };

    Some(ParseResult {
        original_name: name.to_string(),
        series_name: captured.series_name,
        series_num,
        season_number,
        episode_numbers,
        absolute_episode_numbers,
        air_date,
        extra_info: captured.extra_info,
        release_group: captured.release_group,
        version: captured.version,
        quality: Quality::Unknown,
        score,
        rule: Some(rule.name),
    })
}

/// `Some(None)` when absent, `None` when present but not a number.
fn optional_number(text: Option<&str>) -> Option<Option<i64>> {
    match text {
        Some(text) => parse_number(text).map(Some),
        None => Some(None),
    }
}

/// Decimal or roman-numeral (`Part.II`) number.
fn parse_number(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| roman_to_int(text))
}

fn roman_to_int(text: &str) -> Option<i64> {
    let digits = text
        .chars()
        .map(|c| match c.to_ascii_lowercase() {
            'i' => Some(1),
            'v' => Some(5),
            'x' => Some(10),
            _ => None,
        })
        .collect::<Option<Vec<i64>>>()?;
    if digits.is_empty() {
        return None;
    }

    let mut total = 0;
    for (i, &value) in digits.iter().enumerate() {
        match digits.get(i + 1) {
            Some(&next) if next > value => total -= value,
            _ => total += value,
        }
    }
    (total > 0).then_some(total)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
