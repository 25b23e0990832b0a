use std::sync::LazyLock;

use regex::Regex;

/// Separator characters stripped from the ends of an extracted title.
const TITLE_TRIM: &[char] = &[' ', '.', '_', '-'];

/// Season/episode information detected in a single filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDescriptor {
    pub title: String,
    /// Numeric string, "1" when the filename carries no season.
    pub season: String,
    /// Numeric string, "1" when the filename carries no episode.
    pub episode: String,
    pub extension: Option<String>,
}

// Filename patterns in priority order. The first match wins, even when a
// later pattern would parse the name more sensibly; downstream naming
// depends on this exact ordering.
static EPISODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // S01E02 / 1x02 style: title, season, episode
        r"(?i)(.+?)[\s._-]*S?(\d+)[\s._-]*E?(\d+)",
        // season followed by a two-digit episode: "Show 1 02"
        r"(?i)(.+?)[\s._-]*(\d+)[\s._-]*(\d{2})",
        // EP5 style, episode number only
        r"(?i)(.+?)[\s._-]*EP?[\s._-]*(\d+)",
        // "3 of 10" style, total is discarded
        r"(?i)(.+?)[\s._-]*(\d+)[\s._-]*of[\s._-]*\d+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("invalid episode pattern"))
    .collect()
});

/// Extract title/season/episode from a filename.
///
/// Patterns with two numeric groups yield season and episode; patterns with
/// a single numeric group yield the episode with season defaulting to "1".
/// A filename matching no pattern falls back to the name without its
/// extension, season 1, episode 1.
pub fn extract_episode_info(filename: &str) -> EpisodeDescriptor {
    for pattern in EPISODE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(filename) else {
            continue;
        };
        let title = caps[1].trim_matches(TITLE_TRIM).to_string();
        let (season, episode) = if caps.len() > 3 {
            (caps[2].to_string(), caps[3].to_string())
        } else {
            ("1".to_string(), caps[2].to_string())
        };
        return EpisodeDescriptor {
            title,
            season,
            episode,
            extension: None,
        };
    }

    let (stem, _) = split_extension(filename);
    EpisodeDescriptor {
        title: stem.trim_matches(TITLE_TRIM).to_string(),
        season: "1".to_string(),
        episode: "1".to_string(),
        extension: None,
    }
}

/// Split a filename into stem and extension (without the dot).
pub(crate) fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}
