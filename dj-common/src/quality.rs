//! Audio quality tiers and best-file selection
//!
//! Quality ordering is WAV > FLAC > MP3; anything else does not qualify
//! as a downloadable track.

use serde::{Deserialize, Serialize};

/// Audio container/encoding quality tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AudioQuality {
    Wav,
    Flac,
    Mp3,
    #[default]
    Unknown,
}

impl AudioQuality {
    /// Ordinal quality score: WAV=3, FLAC=2, MP3=1, other=0
    pub fn tier(self) -> u8 {
        match self {
            AudioQuality::Wav => 3,
            AudioQuality::Flac => 2,
            AudioQuality::Mp3 => 1,
            AudioQuality::Unknown => 0,
        }
    }

    /// Determine quality from a filename's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.ends_with(".wav") {
            AudioQuality::Wav
        } else if lower.ends_with(".flac") {
            AudioQuality::Flac
        } else if lower.ends_with(".mp3") {
            AudioQuality::Mp3
        } else {
            AudioQuality::Unknown
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AudioQuality::Unknown)
    }
}

/// A concrete file offered for one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub filename: String,
    pub size_bytes: u64,
}

/// Pick the best file from a list of offers.
///
/// Files without a recognized audio extension are discarded; among the
/// rest the highest quality tier wins, with larger size breaking ties.
/// Returns `None` when nothing qualifies.
pub fn pick_best(files: &[RawFile]) -> Option<&RawFile> {
    let mut best: Option<&RawFile> = None;

    for file in files {
        let tier = AudioQuality::from_filename(&file.filename).tier();
        if tier == 0 {
            continue;
        }

        match best {
            None => best = Some(file),
            Some(current) => {
                let current_tier = AudioQuality::from_filename(&current.filename).tier();
                if tier > current_tier
                    || (tier == current_tier && file.size_bytes > current.size_bytes)
                {
                    best = Some(file);
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(filename: &str, size_bytes: u64) -> RawFile {
        RawFile {
            filename: filename.to_string(),
            size_bytes,
        }
    }

    #[test]
    fn test_tier_ordering() {
        assert_eq!(AudioQuality::Wav.tier(), 3);
        assert_eq!(AudioQuality::Flac.tier(), 2);
        assert_eq!(AudioQuality::Mp3.tier(), 1);
        assert_eq!(AudioQuality::Unknown.tier(), 0);
    }

    #[test]
    fn test_from_filename_case_insensitive() {
        assert_eq!(AudioQuality::from_filename("track.WAV"), AudioQuality::Wav);
        assert_eq!(AudioQuality::from_filename("track.Flac"), AudioQuality::Flac);
        assert_eq!(AudioQuality::from_filename("track.mp3"), AudioQuality::Mp3);
    }

    #[test]
    fn test_from_filename_unknown_formats() {
        assert_eq!(AudioQuality::from_filename("track.m4a"), AudioQuality::Unknown);
        assert_eq!(AudioQuality::from_filename("track.ogg"), AudioQuality::Unknown);
        assert_eq!(AudioQuality::from_filename("noextension"), AudioQuality::Unknown);
    }

    #[test]
    fn test_pick_best_prefers_wav() {
        let files = vec![
            file("song.mp3", 5_000_000),
            file("song.flac", 30_000_000),
            file("song.wav", 50_000_000),
        ];
        assert_eq!(pick_best(&files).unwrap().filename, "song.wav");
    }

    #[test]
    fn test_pick_best_prefers_flac_over_mp3() {
        let files = vec![file("song.mp3", 5_000_000), file("song.flac", 30_000_000)];
        assert_eq!(pick_best(&files).unwrap().filename, "song.flac");
    }

    #[test]
    fn test_pick_best_size_breaks_ties() {
        let files = vec![
            file("song_128.mp3", 3_000_000),
            file("song_320.mp3", 8_000_000),
        ];
        assert_eq!(pick_best(&files).unwrap().filename, "song_320.mp3");
    }

    #[test]
    fn test_pick_best_quality_beats_size() {
        let files = vec![
            file("song.mp3", 90_000_000),
            file("song.wav", 50_000_000),
        ];
        assert_eq!(pick_best(&files).unwrap().filename, "song.wav");
    }

    #[test]
    fn test_pick_best_ignores_non_audio() {
        let files = vec![file("cover.jpg", 500_000), file("song.mp3", 5_000_000)];
        assert_eq!(pick_best(&files).unwrap().filename, "song.mp3");
    }

    #[test]
    fn test_pick_best_empty_input() {
        assert!(pick_best(&[]).is_none());
    }

    #[test]
    fn test_pick_best_no_audio_files() {
        let files = vec![file("cover.jpg", 500_000), file("notes.txt", 1_000)];
        assert!(pick_best(&files).is_none());
    }
}
