//! Audio/video classification of format facet values.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref VIDEO: Regex = Regex::new(
        r"(?i)\b(video\w*|dvds?|blu-?ray|vhs|videocassettes?|films?|motion pictures?)\b"
    )
    .unwrap();
    static ref AUDIO: Regex = Regex::new(
        r"(?i)\b(sound recordings?|audio\w*|music recordings?|spoken word|compact discs?|cds?|lps?|cassettes?)\b"
    )
    .unwrap();
    // Data carriers that share the "CD" spelling with audio discs.
    static ref DATA_DISC: Regex = Regex::new(r"(?i)\bcd[- ]?(roms?|i)\b").unwrap();
}

/// Recorded media kinds that get their own marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Sound recording
    Audio,
    /// Video recording
    Video,
}

/// Classify format values. Video wins when both kinds match. Data discs
/// such as CD-ROMs are not sound recordings.
#[must_use]
pub fn classify_media(formats: &[String]) -> Option<MediaKind> {
    if formats.iter().any(|f| VIDEO.is_match(f)) {
        Some(MediaKind::Video)
    } else if formats
        .iter()
        .any(|f| AUDIO.is_match(&DATA_DISC.replace_all(f, "")))
    {
        Some(MediaKind::Audio)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify_media(&formats(&["Book"])), None);
        assert_eq!(
            classify_media(&formats(&["Sound Recording", "Musical Score"])),
            Some(MediaKind::Audio)
        );
        assert_eq!(classify_media(&formats(&["Video", "DVD"])), Some(MediaKind::Video));
        assert_eq!(
            classify_media(&formats(&["Compact Disc", "Blu-Ray"])),
            Some(MediaKind::Video)
        );
        assert_eq!(classify_media(&formats(&["Audiobook"])), Some(MediaKind::Audio));
        assert_eq!(classify_media(&[]), None);
    }

    #[test]
    fn test_data_discs_are_not_audio() {
        assert_eq!(classify_media(&formats(&["CD-ROM"])), None);
        assert_eq!(classify_media(&formats(&["Computer Resource", "CD-ROM"])), None);
        assert_eq!(classify_media(&formats(&["cd rom", "CD-ROMs"])), None);
        assert_eq!(
            classify_media(&formats(&["CD-ROM", "Sound Recording"])),
            Some(MediaKind::Audio)
        );
        assert_eq!(classify_media(&formats(&["CD"])), Some(MediaKind::Audio));
    }
}
