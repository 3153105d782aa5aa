use regex::Regex;
use std::sync::LazyLock;

static RE_DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{2,}").unwrap());
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Dotted scene form of a show name: `Marvel's Agents of S.H.I.E.L.D.` becomes
/// `Marvels.Agents.of.S.H.I.E.L.D`. Apostrophes survive for anime names.
pub fn sanitize_scene_name(name: &str, anime: bool) -> String {
    let mut out: String = name
        .chars()
        .filter(|c| !matches!(c, ',' | ':' | '(' | ')' | '!' | '?' | '\u{2019}'))
        .filter(|c| anime || *c != '\'')
        .collect();
    out = out
        .replace("- ", ".")
        .replace(' ', ".")
        .replace('_', ".")
        .replace('&', "and")
        .replace('/', ".");
    let out = RE_DOTS.replace_all(&out, ".");
    out.trim_matches('.').to_string()
}

/// Lowercase, space-separated form used for alias lookups.
pub fn full_sanitize_scene_name(name: &str) -> String {
    let dotted = sanitize_scene_name(name, false);
    let spaced: String = dotted
        .chars()
        .map(|c| if matches!(c, '.' | '-') { ' ' } else { c })
        .collect();
    RE_SPACES
        .replace_all(spaced.trim(), " ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sanitize_examples() {
        assert_eq!(
            full_sanitize_scene_name("Marvel's.Agents.of.S.H.I.E.L.D."),
            "marvels agents of s h i e l d"
        );
        assert_eq!(full_sanitize_scene_name("Adventure.Time"), "adventure time");
        assert_eq!(full_sanitize_scene_name("Adventure Time"), "adventure time");
        assert_eq!(full_sanitize_scene_name("Archer (2009)"), "archer 2009");
        assert_eq!(full_sanitize_scene_name("Law & Order: SVU"), "law and order svu");
        assert_eq!(full_sanitize_scene_name("Show_Name - Part"), "show name part");
    }

    #[test]
    fn dotted_form_keeps_apostrophes_for_anime() {
        assert_eq!(
            sanitize_scene_name("Marvel's Agents of S.H.I.E.L.D.", false),
            "Marvels.Agents.of.S.H.I.E.L.D"
        );
        assert_eq!(
            sanitize_scene_name("Wolf's Spirit", true),
            "Wolf's.Spirit"
        );
    }
}
