use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::episode::EpisodeDescriptor;
use crate::error::{Error, Result};

// Characters that are unsafe in filenames on common filesystems.
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("invalid sanitize pattern"));

// {title}, {season} or {episode}, the latter two with an optional
// zero-padding width such as {episode:02d}.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(title|season|episode)(?::0?(\d+)d?)?\}").expect("invalid placeholder pattern")
});

/// Render a descriptor through a naming template.
///
/// Season is zero-padded to two digits; the episode placeholder accepts an
/// explicit width (`{episode:02d}` pads to two). Unknown placeholders are
/// left verbatim. A non-numeric episode yields [`Error::Format`] so the
/// caller can fall back to the raw title instead of aborting the batch.
pub fn generate_name(info: &EpisodeDescriptor, template: &str) -> Result<String> {
    let season = zero_pad(&info.season, 2);
    let episode: u32 = info.episode.parse().map_err(|_| {
        Error::Format(format!(
            "episode {:?} of {:?} is not numeric",
            info.episode, info.title
        ))
    })?;
    let title = sanitize_title(info.title.trim());

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let width = caps
            .get(2)
            .and_then(|w| w.as_str().parse::<usize>().ok())
            .unwrap_or(0);
        match &caps[1] {
            "title" => title.clone(),
            "season" => zero_pad(&season, width),
            "episode" => format!("{episode:0width$}"),
            _ => unreachable!("placeholder pattern matched an unknown name"),
        }
    });
    Ok(rendered.into_owned())
}

/// Replace filesystem-unsafe characters with underscores.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_CHARS.replace_all(title, "_").into_owned()
}

fn zero_pad(value: &str, width: usize) -> String {
    format!("{value:0>width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(title: &str, season: &str, episode: &str) -> EpisodeDescriptor {
        EpisodeDescriptor {
            title: title.to_string(),
            season: season.to_string(),
            episode: episode.to_string(),
            extension: None,
        }
    }

    #[test]
    fn renders_padded_template() {
        let name = generate_name(
            &descriptor("My:Show", "1", "2"),
            "S{season}E{episode:02d}_{title}",
        )
        .unwrap();
        assert_eq!(name, "S01E02_My_Show");
    }

    #[test]
    fn episode_without_width_is_not_padded() {
        let name = generate_name(&descriptor("Show", "1", "5"), "{title}.S{season}E{episode}")
            .unwrap();
        assert_eq!(name, "Show.S01E5");
    }

    #[test]
    fn season_keeps_more_than_two_digits() {
        let name = generate_name(&descriptor("Show", "100", "1"), "S{season}").unwrap();
        assert_eq!(name, "S100");
    }

    #[test]
    fn non_numeric_episode_is_a_format_error() {
        let err = generate_name(&descriptor("Show", "1", "five"), "{title}").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn unknown_placeholders_are_left_verbatim() {
        let name = generate_name(&descriptor("Show", "1", "1"), "{show}_{title}").unwrap();
        assert_eq!(name, "{show}_Show");
    }

    #[test]
    fn sanitizes_all_unsafe_characters() {
        assert_eq!(sanitize_title(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_title("Normal_File.Name"), "Normal_File.Name");
    }
}
