use regex::Regex;
use std::sync::LazyLock;
use tvarr_core::Quality;

// Label patterns, most specific first so "1080p HD TV" wins over "HD TV".
static LABEL_PATTERNS: LazyLock<Vec<(Quality, Regex)>> = LazyLock::new(|| {
    let mut tiers: Vec<Quality> = Quality::ALL
        .into_iter()
        .filter(|q| *q != Quality::Unknown)
        .collect();
    tiers.sort_by_key(|q| std::cmp::Reverse(q.value()));
    tiers
        .into_iter()
        .map(|q| {
            let label = regex::escape(q.label()).replace(' ', r"\W");
            let re = Regex::new(&format!(r"(?:^|\W){label}(?:$|\W)")).unwrap();
            (q, re)
        })
        .collect()
});

macro_rules! rx {
    ($pat:literal) => {{
        static RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(concat!("(?i)", $pat)).unwrap());
        &*RE
    }};
}

fn any_of(name: &str, patterns: &[&Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(name))
}

fn all_of(name: &str, patterns: &[&Regex]) -> bool {
    patterns.iter().all(|re| re.is_match(name))
}

/// Classify a release name into a quality tier. Never fails: `Unknown` is a
/// valid low-confidence answer.
pub fn classify_quality(name: &str, anime: bool) -> Quality {
    if let Some(q) = quality_from_label(name) {
        return q;
    }
    if anime {
        guess_anime_quality(name)
    } else {
        guess_quality(name)
    }
}

/// Tier whose canonical label appears in `name` as a distinct token.
pub fn quality_from_label(name: &str) -> Option<Quality> {
    LABEL_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(name))
        .map(|(q, _)| *q)
}

fn guess_quality(name: &str) -> Quality {
    let hd_res = all_of(name, &[rx!("(720|1080)[pi]")]);

    if (all_of(name, &[rx!("(pdtv|hdtv|dsr|tvrip).(xvid|x264|h.?264)")])
        && !hd_res
        && !any_of(name, &[rx!("hr.ws.pdtv.x264")]))
        || (all_of(name, &[rx!("web.dl|webrip"), rx!("xvid|x264|h.?264")]) && !hd_res)
    {
        return Quality::SdTv;
    }
    if any_of(name, &[rx!("(dvdrip|b[r|d]rip)(.ws)?.(xvid|divx|x264)")]) && !hd_res {
        return Quality::SdDvd;
    }
    if (all_of(name, &[rx!("720p"), rx!("hdtv"), rx!("[hx]264")])
        || any_of(name, &[rx!("hr.ws.pdtv.x264")]))
        && !all_of(name, &[rx!("(1080)[pi]")])
    {
        return Quality::HdTv;
    }
    if all_of(name, &[rx!("720p|1080i"), rx!("hdtv"), rx!("mpeg-?2")])
        || all_of(name, &[rx!("1080[pi].hdtv"), rx!("h.?264")])
    {
        return Quality::RawHdTv;
    }
    if all_of(name, &[rx!("1080p"), rx!("hdtv"), rx!("x264")]) {
        return Quality::FullHdTv;
    }
    if all_of(name, &[rx!("720p"), rx!("web.dl|webrip")])
        || all_of(name, &[rx!("720p"), rx!("itunes"), rx!("h.?264")])
    {
        return Quality::HdWebDl;
    }
    if all_of(name, &[rx!("1080p"), rx!("web.dl|webrip")])
        || all_of(name, &[rx!("1080p"), rx!("itunes"), rx!("h.?264")])
    {
        return Quality::FullHdWebDl;
    }
    if all_of(name, &[rx!("720p"), rx!("bluray|hddvd|b[r|d]rip"), rx!("x264")]) {
        return Quality::HdBluRay;
    }
    if all_of(name, &[rx!("1080p"), rx!("bluray|hddvd|b[r|d]rip"), rx!("x264")]) {
        return Quality::FullHdBluRay;
    }
    Quality::Unknown
}

fn guess_anime_quality(name: &str) -> Quality {
    let dvd = any_of(name, &[rx!("dvd"), rx!("dvdrip")]);
    let bluray = any_of(name, &[rx!("bluray"), rx!("blu-ray"), rx!("BD")]);
    let sd = any_of(name, &[rx!("360p"), rx!("480p"), rx!("848x480"), rx!("XviD")]);
    let hd = any_of(name, &[rx!("720p"), rx!("1280x720"), rx!("960x720")]);
    let full_hd = any_of(name, &[rx!("1080p"), rx!("1920x1080")]);

    if sd && !bluray && !dvd {
        Quality::SdTv
    } else if dvd {
        Quality::SdDvd
    } else if hd && !bluray && !full_hd {
        Quality::HdTv
    } else if full_hd && !bluray && !hd {
        Quality::FullHdTv
    } else if bluray && hd && !full_hd {
        Quality::HdBluRay
    } else if bluray && full_hd && !hd {
        Quality::FullHdBluRay
    } else {
        Quality::Unknown
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
