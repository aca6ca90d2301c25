//! Language tag normalization and matching
//!
//! Track and preference languages are compared after normalization so that
//! `"eng"`, `"en"` and `"EN"` all describe the same language. The main subtag
//! is folded to its two-letter ISO 639-1 code where one exists; ISO 639-2
//! bibliographic codes (`"fre"`, `"ger"`) are folded as well.

/// The ISO 639-2 code for an undetermined language.
pub const UNDETERMINED: &str = "und";

/// ISO 639-2 (terminology and bibliographic) to ISO 639-1.
const ISO3_TO_ISO2: &[(&str, &str)] = &[
    ("ara", "ar"),
    ("bul", "bg"),
    ("cat", "ca"),
    ("ces", "cs"),
    ("cze", "cs"),
    ("cym", "cy"),
    ("wel", "cy"),
    ("dan", "da"),
    ("deu", "de"),
    ("ger", "de"),
    ("ell", "el"),
    ("gre", "el"),
    ("eng", "en"),
    ("spa", "es"),
    ("est", "et"),
    ("eus", "eu"),
    ("baq", "eu"),
    ("fas", "fa"),
    ("per", "fa"),
    ("fin", "fi"),
    ("fra", "fr"),
    ("fre", "fr"),
    ("gle", "ga"),
    ("heb", "he"),
    ("hin", "hi"),
    ("hrv", "hr"),
    ("hun", "hu"),
    ("hye", "hy"),
    ("arm", "hy"),
    ("ind", "id"),
    ("isl", "is"),
    ("ice", "is"),
    ("ita", "it"),
    ("jpn", "ja"),
    ("kat", "ka"),
    ("geo", "ka"),
    ("kor", "ko"),
    ("lit", "lt"),
    ("lav", "lv"),
    ("mkd", "mk"),
    ("mac", "mk"),
    ("msa", "ms"),
    ("may", "ms"),
    ("mya", "my"),
    ("bur", "my"),
    ("nld", "nl"),
    ("dut", "nl"),
    ("nor", "no"),
    ("pol", "pl"),
    ("por", "pt"),
    ("ron", "ro"),
    ("rum", "ro"),
    ("rus", "ru"),
    ("slk", "sk"),
    ("slo", "sk"),
    ("slv", "sl"),
    ("sqi", "sq"),
    ("alb", "sq"),
    ("srp", "sr"),
    ("swe", "sv"),
    ("tha", "th"),
    ("tur", "tr"),
    ("ukr", "uk"),
    ("vie", "vi"),
    ("zho", "zh"),
    ("chi", "zh"),
    ("bod", "bo"),
    ("tib", "bo"),
    ("mri", "mi"),
    ("mao", "mi"),
];

/// Normalize a language tag.
///
/// Lowercases, replaces `_` with `-`, and folds the main subtag to ISO 639-1
/// where known. Empty input yields `None`.
pub fn normalize(language: &str) -> Option<String> {
    let tag = language.trim().replace('_', "-").to_ascii_lowercase();
    if tag.is_empty() {
        return None;
    }
    let (main, rest) = match tag.split_once('-') {
        Some((main, rest)) => (main.to_string(), Some(rest.to_string())),
        None => (tag.clone(), None),
    };
    let main = ISO3_TO_ISO2
        .iter()
        .find(|(iso3, _)| *iso3 == main)
        .map(|(_, iso2)| iso2.to_string())
        .unwrap_or(main);
    Some(match rest {
        Some(rest) => format!("{}-{}", main, rest),
        None => main,
    })
}

/// Map the undetermined language (`"und"`) and empty tags to `None`.
pub fn undetermined_to_none(language: Option<&str>) -> Option<&str> {
    match language {
        None => None,
        Some(l) if l.is_empty() || l == UNDETERMINED => None,
        Some(l) => Some(l),
    }
}

/// Main language subtag (`"fr"` for `"fr-ca"`).
pub fn main_language(language: &str) -> &str {
    language.split('-').next().unwrap_or(language)
}

/// Score how well a track language matches a queried language.
///
/// Both arguments must already be normalized.
///
/// * `4` - literal match (including an explicit `"und"` query)
/// * `3` - one tag is a prefix of the other (`"zh-hans"` / `"zh-hans-hk"`)
/// * `2` - same main language (`"fr-fr"` / `"fr-ca"`)
/// * `1` - the track language is undetermined and that is allowed
/// * `0` - no match
pub fn match_score(
    track_language: Option<&str>,
    query: Option<&str>,
    allow_undetermined_track_language: bool,
) -> u8 {
    if let (Some(query), Some(track)) = (query, track_language) {
        if !query.is_empty() && query == track {
            return 4;
        }
    }
    let query = undetermined_to_none(query);
    let track = undetermined_to_none(track_language);
    let (Some(query), Some(track)) = (query, track) else {
        return if allow_undetermined_track_language && track.is_none() {
            1
        } else {
            0
        };
    };
    if track.starts_with(query) || query.starts_with(track) {
        return 3;
    }
    if main_language(track) == main_language(query) {
        return 2;
    }
    0
}

/// Find the first preferred language the track matches.
///
/// Preferences are normalized here, so raw tags such as `"eng"` match; blank
/// entries are skipped but keep their position. Returns `(index, score)` or
/// `(usize::MAX, 0)` when nothing matches. An empty preference list is
/// treated as a single empty query so that undetermined-language fallbacks
/// still apply.
pub fn best_preference_match(
    track_language: Option<&str>,
    preferred: &[String],
    allow_undetermined_track_language: bool,
) -> (usize, u8) {
    let queries: Vec<(usize, String)> = preferred
        .iter()
        .enumerate()
        .filter_map(|(index, query)| normalize(query).map(|query| (index, query)))
        .collect();
    if queries.is_empty() {
        let score = match_score(track_language, Some(""), allow_undetermined_track_language);
        return if score > 0 { (0, score) } else { (usize::MAX, 0) };
    }
    for (index, query) in &queries {
        let score = match_score(track_language, Some(query), allow_undetermined_track_language);
        if score > 0 {
            return (*index, score);
        }
    }
    (usize::MAX, 0)
}
