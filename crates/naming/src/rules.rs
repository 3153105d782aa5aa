//! Ordered release-name rules.
//!
//! Each rule is a pure capture function. Constructs the `regex` crate does
//! not support (backreferences, lookaround) are checked in code after the
//! match: repeated-season equality, resolution tokens mistaken for episode
//! numbers, and the "is this hyphen really a release group" test.

use regex::{Captures, Regex};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFamily {
    Standard,
    Anime,
}

/// Which rules a parser tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSet {
    #[default]
    Standard,
    Anime,
    All,
}

impl RuleSet {
    pub fn rules(self) -> impl Iterator<Item = &'static NameRule> {
        RULES.iter().filter(move |r| match self {
            RuleSet::Standard => r.family == RuleFamily::Standard,
            RuleSet::Anime => r.family == RuleFamily::Anime,
            RuleSet::All => true,
        })
    }
}

/// Raw text captured by a rule, before any numeric conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub series_name: Option<String>,
    pub series_num: Option<String>,
    pub season_num: Option<String>,
    pub ep_num: Option<String>,
    pub extra_ep_nums: Vec<String>,
    pub ep_ab_num: Option<String>,
    pub extra_ab_ep_nums: Vec<String>,
    pub air_date: Option<String>,
    pub extra_info: Option<String>,
    pub release_group: Option<String>,
    pub version: Option<String>,
}

pub struct NameRule {
    pub name: &'static str,
    pub family: RuleFamily,
    capture: fn(&str) -> Option<Captured>,
}

impl NameRule {
    pub fn capture(&self, input: &str) -> Option<Captured> {
        (self.capture)(input)
    }
}

impl std::fmt::Debug for NameRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameRule")
            .field("name", &self.name)
            .field("family", &self.family)
            .finish()
    }
}

macro_rules! rule {
    ($name:ident, $family:ident) => {
        NameRule {
            name: stringify!($name),
            family: RuleFamily::$family,
            capture: $name,
        }
    };
}

/// Priority order: earlier rules score higher.
pub static RULES: &[NameRule] = &[
    rule!(standard_repeat, Standard),
    rule!(fov_repeat, Standard),
    rule!(standard, Standard),
    rule!(fov, Standard),
    rule!(scene_date_format, Standard),
    rule!(scene_sports_format, Standard),
    rule!(stupid, Standard),
    rule!(verbose, Standard),
    rule!(season_only, Standard),
    rule!(no_season_multi_ep, Standard),
    rule!(no_season_general, Standard),
    rule!(no_season, Standard),
    rule!(bare, Standard),
    rule!(anime_ultimate, Anime),
    rule!(anime_standard, Anime),
    rule!(anime_standard_round, Anime),
    rule!(anime_slash, Anime),
    rule!(anime_standard_codec, Anime),
    rule!(anime_codec_crc, Anime),
    rule!(anime_and_normal, Anime),
    rule!(anime_and_normal_x, Anime),
    rule!(anime_and_normal_reverse, Anime),
    rule!(anime_and_normal_front, Anime),
    rule!(anime_ep_name, Anime),
    rule!(anime_bare, Anime),
];

const SEP: &[char] = &['.', ' ', '_', '-'];
const SEP_OR_BRACKET: &[char] = &[']', '.', ' ', '_', '-'];

static RE_GROUP_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<extra_info>.+?)(?:-(?P<release_group>[^- ]+(?:[. _-]\[.*\])?))?$").unwrap()
});

static RE_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:1080|720|480)[pi]").unwrap());

static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

fn text(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn digit_runs(caps: &Captures<'_>, name: &str) -> Vec<String> {
    caps.name(name)
        .map(|m| {
            RE_DIGITS
                .find_iter(m.as_str())
                .map(|d| d.as_str().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Split the trailing `Source.Quality.Etc-Group` part of a release name.
/// A hyphen directly after a separator or after "WEB" (as in `WEB-DL`) is
/// not a release-group marker.
fn group_tail(rest: &str, lead: &[char]) -> (Option<String>, Option<String>) {
    let rest = rest.trim_start_matches(lead);
    let Some(caps) = RE_GROUP_TAIL.captures(rest) else {
        return (None, None);
    };
    match (text(&caps, "extra_info"), text(&caps, "release_group")) {
        (Some(extra), Some(group))
            if extra.ends_with(SEP) || extra.to_ascii_uppercase().ends_with("WEB") =>
        {
            (Some(format!("{extra}-{group}")), None)
        }
        other => other,
    }
}

/// Match `item` repeatedly starting at byte `pos`, stopping at the first
/// match `accept` rejects. Returns the accepted matches and the end offset.
fn repeated<'h>(
    input: &'h str,
    mut pos: usize,
    item: &Regex,
    accept: impl Fn(&Captures<'h>, usize) -> bool,
) -> (Vec<Captures<'h>>, usize) {
    let mut found = Vec::new();
    while let Some(caps) = item.captures(&input[pos..]) {
        let consumed = caps.get(0).map_or(0, |m| m.end());
        if consumed == 0 || !accept(&caps, pos) {
            break;
        }
        pos += consumed;
        found.push(caps);
    }
    (found, pos)
}

/// True when the number starting at byte `at` is really a resolution like `720p`.
fn is_resolution_at(input: &str, at: usize) -> bool {
    RE_RESOLUTION.is_match(&input[at..])
}

fn group_start(caps: &Captures<'_>, group: usize) -> usize {
    caps.get(group).map_or(0, |m| m.start())
}

// ─── Standard rules ──────────────────────────────────────────────────────────

static RE_STANDARD_REPEAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<series_name>.+?)[. _-]+s(?P<season_num>\d+)[. _-]*e(?P<ep_num>\d+)(?P<repeats>(?:[. _-]+s\d+[. _-]*e\d+)+)",
    )
    .unwrap()
});
static RE_STANDARD_REPEAT_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[. _-]+s(\d+)[. _-]*e(\d+)").unwrap());

// Show.Name.S01E02.S01E03.Source.Quality.Etc-Group
fn standard_repeat(input: &str) -> Option<Captured> {
    season_repeat(input, &RE_STANDARD_REPEAT, &RE_STANDARD_REPEAT_ITEM)
}

static RE_FOV_REPEAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<series_name>.+?)[. _-]+(?P<season_num>\d+)x(?P<ep_num>\d+)(?P<repeats>(?:[. _-]+\d+x\d+)+)",
    )
    .unwrap()
});
static RE_FOV_REPEAT_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[. _-]+(\d+)x(\d+)").unwrap());

// Show.Name.1x02.1x03.Source.Quality.Etc-Group
fn fov_repeat(input: &str) -> Option<Captured> {
    season_repeat(input, &RE_FOV_REPEAT, &RE_FOV_REPEAT_ITEM)
}

/// Every repeat must restate the first season verbatim.
fn season_repeat(input: &str, head: &Regex, item: &Regex) -> Option<Captured> {
    let caps = head.captures(input)?;
    let season = caps.name("season_num")?.as_str();
    let start = caps.name("repeats")?.start();
    let (repeats, end) = repeated(input, start, item, |c, _| &c[1] == season);
    if repeats.is_empty() {
        return None;
    }
    let (extra_info, release_group) = group_tail(&input[end..], SEP);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        season_num: Some(season.to_string()),
        ep_num: text(&caps, "ep_num"),
        extra_ep_nums: repeats.iter().map(|c| c[2].to_string()).collect(),
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_STANDARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<series_name>.+?)[. _-]+)?\(?s(?P<season_num>\d+)[. _-]*e(?P<ep_num>\d+)\)?",
    )
    .unwrap()
});
static RE_STANDARD_EXTRA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:[. _-]*e|-)(\d+)\)?").unwrap());

// Show.Name.S01E02E03.Source.Quality.Etc-Group
fn standard(input: &str) -> Option<Captured> {
    let caps = RE_STANDARD.captures(input)?;
    let head_end = caps.get(0)?.end();
    let (extras, end) = repeated(input, head_end, &RE_STANDARD_EXTRA, |c, pos| {
        !is_resolution_at(input, pos + group_start(c, 1))
    });
    let (extra_info, release_group) = group_tail(&input[end..], SEP);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        season_num: text(&caps, "season_num"),
        ep_num: text(&caps, "ep_num"),
        extra_ep_nums: extras.iter().map(|c| c[1].to_string()).collect(),
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_FOV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?P<series_name>.+?)[\[. _-]+)?(?P<season_num>\d+)x(?P<ep_num>\d+)")
        .unwrap()
});
static RE_FOV_EXTRA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:[. _-]*x|-)(\d+)").unwrap());

// Show_Name.1x02x03x04.Source_Quality_Etc-Group
fn fov(input: &str) -> Option<Captured> {
    let caps = RE_FOV.captures(input)?;
    let head_end = caps.get(0)?.end();
    let (extras, end) = repeated(input, head_end, &RE_FOV_EXTRA, |c, pos| {
        let at = pos + group_start(c, 1);
        let codec = input[..at].ends_with(['x', 'X']) && input[at..].starts_with("264");
        !codec && !is_resolution_at(input, at)
    });
    let (extra_info, release_group) = group_tail(&input[end..], SEP_OR_BRACKET);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        season_num: text(&caps, "season_num"),
        ep_num: text(&caps, "ep_num"),
        extra_ep_nums: extras.iter().map(|c| c[1].to_string()).collect(),
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_SCENE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<series_name>.+?)[. _-]+)?(?P<air_date>\d+[. _-]\d+[. _-]\d+|\d+\w+[. _-]\w+[. _-]\d+)",
    )
    .unwrap()
});

// Show.Name.2010.11.23.Source.Quality.Etc-Group
fn scene_date_format(input: &str) -> Option<Captured> {
    let caps = RE_SCENE_DATE.captures(input)?;
    let end = caps.get(0)?.end();
    let (extra_info, release_group) = group_tail(&input[end..], SEP);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        air_date: text(&caps, "air_date"),
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_SCENE_SPORTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<series_name>.*?(?:UEFA|MLB|ESPN|WWE|MMA|UFC|TNA|EPL|NASCAR|NBA|NFL|NHL|NRL|PGA|SUPER LEAGUE|FORMULA|FIFA|NETBALL|MOTOGP).*?)[. _-]+(?:(?P<series_num>\d{1,3})[. _-]+)?(?P<air_date>\d+[. _-]\d+[. _-]\d+|\d+\w+[. _-]\w+[. _-]\d+)[. _-]+",
    )
    .unwrap()
});

// NFL.2015.01.04.Team.vs.Team.720p.HDTV.x264-GRP
fn scene_sports_format(input: &str) -> Option<Captured> {
    let caps = RE_SCENE_SPORTS.captures(input)?;
    let end = caps.get(0)?.end();
    let (extra_info, release_group) = group_tail(&input[end..], &[]);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        series_num: text(&caps, "series_num"),
        air_date: text(&caps, "air_date"),
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_STUPID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<release_group>.+?)-\w+?[. ]?(?P<season_num>\d{1,2})(?P<ep_num>\d{2})$")
        .unwrap()
});

// tpz-abc102
fn stupid(input: &str) -> Option<Captured> {
    let caps = RE_STUPID.captures(input)?;
    if input[caps.name("season_num")?.start()..].starts_with("264") {
        return None;
    }
    Some(Captured {
        release_group: text(&caps, "release_group"),
        season_num: text(&caps, "season_num"),
        ep_num: text(&caps, "ep_num"),
        ..Default::default()
    })
}

static RE_VERBOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<series_name>.+?)[. _-]+season[. _-]+(?P<season_num>\d+)[. _-]+episode[. _-]+(?P<ep_num>\d+)[. _-]+(?P<extra_info>.+)$",
    )
    .unwrap()
});

// Show Name Season 1 Episode 2 Ep Name
fn verbose(input: &str) -> Option<Captured> {
    let caps = RE_VERBOSE.captures(input)?;
    Some(Captured {
        series_name: text(&caps, "series_name"),
        season_num: text(&caps, "season_num"),
        ep_num: text(&caps, "ep_num"),
        extra_info: text(&caps, "extra_info"),
        ..Default::default()
    })
}

static RE_SEASON_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?P<series_name>.+?)[. _-]+)?s(?:eason[. _-])?(?P<season_num>\d+)[. _-]*")
        .unwrap()
});

// Show.Name.S01.Source.Quality.Etc-Group
fn season_only(input: &str) -> Option<Captured> {
    let caps = RE_SEASON_ONLY.captures(input)?;
    let end = caps.get(0)?.end();
    let (extra_info, release_group) = group_tail(&input[end..], SEP);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        season_num: text(&caps, "season_num"),
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_NO_SEASON_MULTI_EP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<series_name>.+?)[. _-]+)?(?:e(?:p(?:isode)?)?|part|pt)[. _-]?(?P<ep_num>\d+|[ivx]+\b)(?:[. _-]+(?:and|&|to)[. _-]+|-)(?P<extra_ep_num>\d+|[ivx]+\b)[. _-]",
    )
    .unwrap()
});

// Show.Name.E02-03.Source-Group, Show.Name.Part.1.and.2.Source
fn no_season_multi_ep(input: &str) -> Option<Captured> {
    let caps = RE_NO_SEASON_MULTI_EP.captures(input)?;
    let extra = caps.name("extra_ep_num")?;
    if is_resolution_at(input, extra.start()) {
        return None;
    }
    let end = caps.get(0)?.end();
    let (extra_info, release_group) = group_tail(&input[end..], SEP);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        ep_num: text(&caps, "ep_num"),
        extra_ep_nums: vec![extra.as_str().to_string()],
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_NO_SEASON_GENERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<series_name>.+?)[. _-]+)?(?:e(?:p(?:isode)?)?|part|pt)[. _-]?(?P<ep_num>\d+|[ivx]+\b)",
    )
    .unwrap()
});
static RE_NO_SEASON_GENERAL_EXTRA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[. _-]+(?:(?:and|&|to)[. _-]+)?(?:e(?:p(?:isode)?)?|part|pt)[. _-]?(\d+|[ivx]+\b)[. _-]",
    )
    .unwrap()
});

// Show.Name.Part.1.and.Part.2.Blah-Group
fn no_season_general(input: &str) -> Option<Captured> {
    let caps = RE_NO_SEASON_GENERAL.captures(input)?;
    let head_end = caps.get(0)?.end();
    let (extras, end) = repeated(input, head_end, &RE_NO_SEASON_GENERAL_EXTRA, |c, pos| {
        !is_resolution_at(input, pos + group_start(c, 1))
    });
    let (extra_info, release_group) = group_tail(&input[end..], SEP);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        ep_num: text(&caps, "ep_num"),
        extra_ep_nums: extras.iter().map(|c| c[1].to_string()).collect(),
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_NO_SEASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<series_name>.+?)(?:[. _-]{2,}|[. _]))?(?P<ep_num>\d{1,3})(?P<extra_eps>(?:-\d{1,3})*)\s?of?\s?\d{1,3}?[. _-]+",
    )
    .unwrap()
});

// Show.Name.2of6.Source-Group
fn no_season(input: &str) -> Option<Captured> {
    let caps = RE_NO_SEASON.captures(input)?;
    let end = caps.get(0)?.end();
    let (extra_info, release_group) = group_tail(&input[end..], &[]);
    Some(Captured {
        series_name: text(&caps, "series_name"),
        ep_num: text(&caps, "ep_num"),
        extra_ep_nums: digit_runs(&caps, "extra_eps"),
        extra_info,
        release_group,
        ..Default::default()
    })
}

static RE_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<series_name>.+?)[. _-]+(?P<season_num>\d{1,2})(?P<ep_num>\d{2})(?:[. _-]+(?P<extra_info>[^-]+)(?:-(?P<release_group>[^- ]+(?:[. _-]\[.*\])?))?)?$",
    )
    .unwrap()
});
static RE_BARE_BAD_EXTRA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}[. _-]").unwrap());

// Show.Name.102.Source.Quality.Etc-Group
fn bare(input: &str) -> Option<Captured> {
    let caps = RE_BARE.captures(input)?;
    if caps
        .name("extra_info")
        .is_some_and(|m| RE_BARE_BAD_EXTRA.is_match(m.as_str()))
    {
        return None;
    }
    Some(Captured {
        series_name: text(&caps, "series_name"),
        season_num: text(&caps, "season_num"),
        ep_num: text(&caps, "ep_num"),
        extra_info: text(&caps, "extra_info"),
        release_group: text(&caps, "release_group"),
        ..Default::default()
    })
}

// ─── Anime rules ─────────────────────────────────────────────────────────────

/// Fields shared by every anime pattern.
fn anime_fields(caps: &Captures<'_>) -> Captured {
    Captured {
        series_name: text(caps, "series_name"),
        season_num: text(caps, "season_num"),
        ep_num: text(caps, "ep_num"),
        extra_ep_nums: digit_runs(caps, "extra_eps"),
        ep_ab_num: text(caps, "ep_ab_num"),
        extra_ab_ep_nums: text(caps, "extra_ab_ep_num").into_iter().collect(),
        extra_info: text(caps, "extra_info"),
        release_group: text(caps, "release_group"),
        version: text(caps, "version"),
        ..Default::default()
    }
}

macro_rules! anime_rule {
    ($fn_name:ident, $static_name:ident, $pattern:literal) => {
        static $static_name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());

        fn $fn_name(input: &str) -> Option<Captured> {
            $static_name.captures(input).map(|c| anime_fields(&c))
        }
    };
}

// [Group] Show Name 01 [720p][CRC12345]
anime_rule!(
    anime_ultimate,
    RE_ANIME_ULTIMATE,
    r"(?i)^\[(?P<release_group>.+?)\][ ._-]*(?P<series_name>.+?)[ ._-]+(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?[ ._-]+?(?:v(?P<version>[0-9]))?[\w.]*(?:[\[(](?P<extra_info>\d{3,4}[xp]?\d{0,4}[.\w\s-]*)[\])]|\d{3,4}[xp])(?:[ ._]?\[(?P<crc>\w+)\])?"
);

// [Group Name] Show Name - 13-14
anime_rule!(
    anime_standard,
    RE_ANIME_STANDARD,
    r"(?i)^(?:\[(?P<release_group>.+?)\][ ._-]*)?(?P<series_name>.+?)[ ._-]+(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?(?:[ ._-]+\[(?P<extra_info>\d{3,4}[xp]?\d{0,4}[.\w\s-]*)\])?(?:\[(?P<crc>\w{8})\])?"
);

// [Stratos-Subs]_Infinite_Stratos_-_12_(1280x720_H.264_AAC)_[379759DB]
anime_rule!(
    anime_standard_round,
    RE_ANIME_STANDARD_ROUND,
    r"(?i)^(?:\[(?P<release_group>.+?)\][ ._-]*)?(?P<series_name>.+?)[ ._-]+(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?[ ._-]+\((?P<extra_info>(?:CX[ ._-]?)?\d{3,4}[xp]?\d{0,4}[.\w\s-]*)\)(?:\[(?P<crc>\w{8})\])?"
);

// [SGKK] Bleach 312v1 [720p/MKV]
anime_rule!(
    anime_slash,
    RE_ANIME_SLASH,
    r"(?i)^(?:\[(?P<release_group>.+?)\][ ._-]*)?(?P<series_name>.+?)[ ._-]+(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?[ ._-]+\[(?P<extra_info>\d{3,4}p)(?:\[(?P<crc>\w{8})\])?"
);

// [Ayako]_Infinite_Stratos_-_IS_-_07_[H264][720p][EB7838FC]
anime_rule!(
    anime_standard_codec,
    RE_ANIME_STANDARD_CODEC,
    r"(?i)^(?:\[(?P<release_group>.+?)\][ ._-]*)?(?P<series_name>.+?)[ ._]*(?:[ ._-]+-[ ._-]+[A-Z]+[ ._-]+)?[ ._-]+(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?(?:[ ._-](?:\[\w{1,2}\])?\[[a-z][.]?\w{2,4}\])?[ ._-]*\[(?P<extra_info>(?:\d{3,4}[xp]?\d{0,4})?[.\w\s-]*)\](?:\[(?P<crc>\w{8})\])?"
);

// [Group] Show Name 05 [h264][ABCD1234]
anime_rule!(
    anime_codec_crc,
    RE_ANIME_CODEC_CRC,
    r"(?i)^(?:\[(?P<release_group>.*?)\][ ._-]*)?(?:(?P<series_name>.*?)[ ._-]*)?(?:(?P<ep_ab_num>\d{1,3})[ ._-]*).+?(?:\[.*?\][ ._-]*)(?:\[(?P<crc>\w{8})\])?"
);

// Bleach - s16e03-04 - 313-314
anime_rule!(
    anime_and_normal,
    RE_ANIME_AND_NORMAL,
    r"(?i)^(?P<series_name>.+?)[ ._-]+s(?P<season_num>\d+)[. _-]*e(?P<ep_num>\d+)(?P<extra_eps>(?:(?:[. _-]*e|-)\d+)*)(?:[ ._-]{2,}|[ ._]+)(?P<ep_ab_num>\d{1,3})?(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?"
);

// Bleach - s16x03-04 - 313-314
anime_rule!(
    anime_and_normal_x,
    RE_ANIME_AND_NORMAL_X,
    r"(?i)^(?P<series_name>.+?)[ ._-]+s(?P<season_num>\d+)[. _-]*x(?P<ep_num>\d+)(?P<extra_eps>(?:(?:[. _-]*e|-)\d+)*)(?:[ ._-]{2,}|[ ._]+)(?P<ep_ab_num>\d{1,3})?(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?"
);

// Bleach - 313-314 - s16e03-04
anime_rule!(
    anime_and_normal_reverse,
    RE_ANIME_AND_NORMAL_REVERSE,
    r"(?i)^(?P<series_name>.+?)[ ._-]+(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?(?:[ ._-]{2,}|[ ._]+)s(?P<season_num>\d+)[. _-]*e(?P<ep_num>\d+)(?P<extra_eps>(?:(?:[. _-]*e|-)\d+)*)"
);

// 165.Naruto Shippuuden.s08e014
anime_rule!(
    anime_and_normal_front,
    RE_ANIME_AND_NORMAL_FRONT,
    r"(?i)^(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?[ ._-]+(?P<series_name>.+?)[ ._-]+s(?P<season_num>\d+)[. _-]*e(?P<ep_num>\d+)(?P<extra_eps>(?:(?:[. _-]*e|-)\d+)*)"
);

// [Group] Show Name - 12 - Episode Title [720p]
anime_rule!(
    anime_ep_name,
    RE_ANIME_EP_NAME,
    r"(?i)^\[(?P<release_group>.+?)\][ ._-]*(?P<series_name>.+?)[ ._-]+(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?[ ._-]*?(?:v(?P<version>[0-9])[ ._-]+?)?(?:.+?[ ._-]+?)?\[(?P<extra_info>\w+)\][ ._-]?(?:\[(?P<crc>\w{8})\])?"
);

// One Piece - 102
anime_rule!(
    anime_bare,
    RE_ANIME_BARE,
    r"(?i)^(?:\[(?P<release_group>.+?)\][ ._-]*)?(?P<series_name>.+?)[ ._-]+(?P<ep_ab_num>\d{1,3})(?:-(?P<extra_ab_ep_num>\d{1,3}))?(?:v(?P<version>[0-9]))?"
);

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static NameRule {
        RULES.iter().find(|r| r.name == name).unwrap()
    }

    fn cap(rule_name: &str, input: &str) -> Captured {
        rule(rule_name)
            .capture(input)
            .unwrap_or_else(|| panic!("{rule_name} should match {input:?}"))
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn every_pattern_compiles() {
        for r in RULES {
            let _ = r.capture("Show.Name.S01E02.Source-Group");
        }
        assert_eq!(RuleSet::Standard.rules().count(), 13);
        assert_eq!(RuleSet::Anime.rules().count(), 12);
        assert_eq!(RuleSet::All.rules().count(), RULES.len());
    }

    #[test]
    fn standard_repeat_requires_same_season() {
        let c = cap("standard_repeat", "Show.Name.S01E02.S01E03.Source.Quality.Etc-Group");
        assert_eq!(c.series_name, s("Show.Name"));
        assert_eq!(c.season_num, s("01"));
        assert_eq!(c.ep_num, s("02"));
        assert_eq!(c.extra_ep_nums, vec!["03"]);
        assert_eq!(c.extra_info, s("Source.Quality.Etc"));
        assert_eq!(c.release_group, s("Group"));

        let c = cap("standard_repeat", "Show Name - S01E02 - S01E03 - S01E04 - Ep Name");
        assert_eq!(c.extra_ep_nums, vec!["03", "04"]);
        assert_eq!(c.extra_info, s("Ep Name"));
        assert_eq!(c.release_group, None);

        assert!(rule("standard_repeat").capture("Show.Name.S01E02.S02E03.Source").is_none());
    }

    #[test]
    fn fov_repeat() {
        let c = cap("fov_repeat", "Show Name - 1x02 - 1x03 - 1x04 - Ep Name");
        assert_eq!(c.season_num, s("1"));
        assert_eq!(c.ep_num, s("02"));
        assert_eq!(c.extra_ep_nums, vec!["03", "04"]);
        assert_eq!(c.extra_info, s("Ep Name"));
    }

    #[test]
    fn standard_variants() {
        let c = cap("standard", "Show Name - S01E02 - My Ep Name");
        assert_eq!(c.series_name, s("Show Name"));
        assert_eq!(c.extra_info, s("My Ep Name"));

        let c = cap("standard", "Show.Name.S01.E03.My.Ep.Name");
        assert_eq!(c.ep_num, s("03"));
        assert_eq!(c.extra_info, s("My.Ep.Name"));

        let c = cap("standard", "Show Name - S01E02-03 - My Ep Name");
        assert_eq!(c.extra_ep_nums, vec!["03"]);

        let c = cap("standard", "Show.Name.S01.E02.E03");
        assert_eq!(c.extra_ep_nums, vec!["03"]);
        assert_eq!(c.extra_info, None);
    }

    #[test]
    fn standard_does_not_take_resolution_as_episode() {
        let c = cap("standard", "Show.Name.S01E02-720p.HDTV.x264-GRP");
        assert!(c.extra_ep_nums.is_empty());
        assert_eq!(c.extra_info, s("720p.HDTV.x264"));
        assert_eq!(c.release_group, s("GRP"));
    }

    #[test]
    fn hyphen_after_web_is_not_a_group() {
        let c = cap("standard", "Show.Name.S01E02.1080p.WEB-DL");
        assert_eq!(c.extra_info, s("1080p.WEB-DL"));
        assert_eq!(c.release_group, None);

        let c = cap("standard", "Show.Name.S01E02.HDTV.-GRP");
        assert_eq!(c.extra_info, s("HDTV.-GRP"));
        assert_eq!(c.release_group, None);
    }

    #[test]
    fn fov_skips_codec_tokens() {
        let c = cap("fov", "Show_Name.1x02x03x04.Source_Quality_Etc-Group");
        assert_eq!(c.series_name, s("Show_Name"));
        assert_eq!(c.extra_ep_nums, vec!["03", "04"]);
        assert_eq!(c.extra_info, s("Source_Quality_Etc"));
        assert_eq!(c.release_group, s("Group"));

        let c = cap("fov", "Show.Name.1x02.x264-GRP");
        assert!(c.extra_ep_nums.is_empty());
        assert_eq!(c.extra_info, s("x264"));
    }

    #[test]
    fn dated_and_sports() {
        let c = cap("scene_date_format", "Show.Name.2010.11.23.Source.Quality.Etc-Group");
        assert_eq!(c.series_name, s("Show.Name"));
        assert_eq!(c.air_date, s("2010.11.23"));
        assert_eq!(c.release_group, s("Group"));

        let c = cap("scene_sports_format", "NFL.2015.01.04.Team.vs.Team.720p.HDTV.x264-GRP");
        assert_eq!(c.series_name, s("NFL"));
        assert_eq!(c.air_date, s("2015.01.04"));
        assert_eq!(c.release_group, s("GRP"));
        assert!(rule("scene_sports_format").capture("Show.Name.2010.11.23.Source").is_none());
    }

    #[test]
    fn odd_standard_forms() {
        let c = cap("stupid", "tpz-abc102");
        assert_eq!(c.release_group, s("tpz"));
        assert_eq!(c.season_num, s("1"));
        assert_eq!(c.ep_num, s("02"));

        let c = cap("verbose", "Show Name Season 1 Episode 2 Ep Name");
        assert_eq!(c.series_name, s("Show Name"));
        assert_eq!(c.ep_num, s("2"));
        assert_eq!(c.extra_info, s("Ep Name"));

        let c = cap("season_only", "Show.Name.S01.Source.Quality.Etc-Group");
        assert_eq!(c.season_num, s("01"));
        assert_eq!(c.release_group, s("Group"));

        let c = cap("bare", "Show.Name.102.Source.Quality.Etc-Group");
        assert_eq!(c.season_num, s("1"));
        assert_eq!(c.ep_num, s("02"));
        assert_eq!(c.extra_info, s("Source.Quality.Etc"));
    }

    #[test]
    fn no_season_forms() {
        let c = cap("no_season_general", "Show.Name.E23.Test");
        assert_eq!(c.series_name, s("Show.Name"));
        assert_eq!(c.ep_num, s("23"));
        assert_eq!(c.extra_info, s("Test"));

        let c = cap("no_season_general", "Show.Name.Part.1.and.Part.2.Blah-Group");
        assert_eq!(c.ep_num, s("1"));
        assert_eq!(c.extra_ep_nums, vec!["2"]);
        assert_eq!(c.extra_info, s("Blah"));
        assert_eq!(c.release_group, s("Group"));

        let c = cap("no_season_multi_ep", "Show.Name.E02-03.Source-Group");
        assert_eq!(c.ep_num, s("02"));
        assert_eq!(c.extra_ep_nums, vec!["03"]);
        assert_eq!(c.release_group, s("Group"));
        assert!(rule("no_season_multi_ep").capture("Show.Name.E02-720p.HDTV").is_none());

        let c = cap("no_season_general", "Show.Name.Part.II.Source");
        assert_eq!(c.ep_num, s("II"));
    }

    #[test]
    fn anime_forms() {
        let c = cap("anime_standard", "[Group Name] Show Name - 13-14");
        assert_eq!(c.release_group, s("Group Name"));
        assert_eq!(c.series_name, s("Show Name"));
        assert_eq!(c.ep_ab_num, s("13"));
        assert_eq!(c.extra_ab_ep_nums, vec!["14"]);

        let c = cap("anime_standard", "Show Name 13");
        assert_eq!(c.series_name, s("Show Name"));
        assert_eq!(c.ep_ab_num, s("13"));

        let c = cap(
            "anime_standard_round",
            "[Stratos-Subs]_Infinite_Stratos_-_12_(1280x720_H.264_AAC)_[379759DB]",
        );
        assert_eq!(c.series_name, s("Infinite_Stratos"));
        assert_eq!(c.extra_info, s("1280x720_H.264_AAC"));
        assert_eq!(c.ep_ab_num, s("12"));

        let c = cap("anime_slash", "[SGKK] Bleach 312v1 [720p/MKV]");
        assert_eq!(c.series_name, s("Bleach"));
        assert_eq!(c.ep_ab_num, s("312"));
        assert_eq!(c.version, s("1"));
        assert_eq!(c.extra_info, s("720p"));

        let c = cap(
            "anime_standard_codec",
            "[Ayako]_Infinite_Stratos_-_IS_-_07_[H264][720p][EB7838FC]",
        );
        assert_eq!(c.series_name, s("Infinite_Stratos"));
        assert_eq!(c.ep_ab_num, s("07"));
        assert_eq!(c.extra_info, s("720p"));

        let c = cap("anime_and_normal", "Bleach - s16e03-04 - 313-314");
        assert_eq!(c.season_num, s("16"));
        assert_eq!(c.ep_num, s("03"));
        assert_eq!(c.extra_ep_nums, vec!["04"]);
        assert_eq!(c.ep_ab_num, s("313"));
        assert_eq!(c.extra_ab_ep_nums, vec!["314"]);

        let c = cap("anime_and_normal_x", "Bleach s16x03e04 313-314");
        assert_eq!(c.extra_ep_nums, vec!["04"]);

        let c = cap("anime_and_normal_reverse", "Bleach - 313-314 - s16e03-04");
        assert_eq!(c.series_name, s("Bleach"));
        assert_eq!(c.ep_ab_num, s("313"));
        assert_eq!(c.extra_ep_nums, vec!["04"]);

        let c = cap("anime_and_normal_front", "165.Naruto Shippuuden.s08e014");
        assert_eq!(c.series_name, s("Naruto Shippuuden"));
        assert_eq!(c.ep_ab_num, s("165"));
        assert_eq!(c.ep_num, s("014"));

        let c = cap("anime_bare", "[ACX]_Wolf's_Spirit_001");
        assert_eq!(c.release_group, s("ACX"));
        assert_eq!(c.series_name, s("Wolf's_Spirit"));
        assert_eq!(c.ep_ab_num, s("001"));
    }
}
