use regex::Regex;
use std::sync::LazyLock;

static MEDIA_EXTENSIONS: &[&str] = &[
    "avi", "mkv", "mpg", "mpeg", "wmv", "ogm", "mp4", "iso", "img", "divx", "m2ts", "m4v", "ts",
    "flv", "f4v", "mov", "rmvb", "vob", "dvr-ms", "wtv", "ogv", "3gp", "webm",
];

// "sample", "Sample01" etc. as a standalone token
static RE_SAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[\W_])sample\d*[\W_]").unwrap());

static RE_EXTRAS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)extras?$").unwrap());

/// Check whether an extension (with or without the leading dot) is a known media type.
pub fn is_media_extension(ext: &str) -> bool {
    let ext = ext.trim_start_matches('.').to_lowercase();
    MEDIA_EXTENSIONS.contains(&ext.as_str())
}

/// Check whether `path` names a media file worth parsing. Samples, resource
/// forks (`._name`) and anything under or named like "extras" are rejected.
pub fn is_media_file(path: &str) -> bool {
    let mut components: Vec<&str> = path.split(['/', '\\']).filter(|c| !c.is_empty()).collect();
    let Some(file_name) = components.pop() else {
        return false;
    };

    if file_name.starts_with("._") || RE_SAMPLE.is_match(file_name) {
        return false;
    }

    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return false;
    };
    if !is_media_extension(ext) || RE_EXTRAS.is_match(stem) {
        return false;
    }

    !components
        .iter()
        .any(|dir| dir.eq_ignore_ascii_case("extras") || dir.eq_ignore_ascii_case("extra"))
}

/// Strip a trailing extension only when it is a media or payload extension,
/// so release names like `Show.S01E02.Source-Group` stay intact.
pub fn strip_media_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if is_media_extension(ext)
                || ext.eq_ignore_ascii_case("nzb")
                || ext.eq_ignore_ascii_case("torrent") =>
        {
            stem
        }
        _ => file_name,
    }
}
