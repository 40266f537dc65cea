//! Search source adapters
//!
//! One adapter per external source, all normalizing into the shared
//! `TrackCandidate` record. Adapters are fanned out concurrently by the
//! aggregator; a failing adapter degrades to an empty result set and
//! never fails the aggregate search.

pub mod soulseek;
pub mod soundcloud;
pub mod spotify;
pub mod youtube;

use dj_common::quality::AudioQuality;
use dj_common::version::VersionTag;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum candidates any single source contributes to a search
pub const RESULTS_PER_SOURCE: usize = 2;

/// External search source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Spotify,
    Youtube,
    Soundcloud,
    Soulseek,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Spotify => "spotify",
            Source::Youtube => "youtube",
            Source::Soundcloud => "soundcloud",
            Source::Soulseek => "soulseek",
        }
    }

    /// Display glyph shown next to results in the dashboard
    pub fn icon(self) -> &'static str {
        match self {
            Source::Spotify => "\u{1F7E2}",
            Source::Youtube => "\u{1F534}",
            Source::Soundcloud => "\u{1F7E0}",
            Source::Soulseek => "\u{1F7E3}",
        }
    }
}

/// One normalized search result from one source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCandidate {
    pub title: String,
    pub artist: String,
    /// Artwork URL; empty when the source has none
    #[serde(rename = "art")]
    pub artwork_url: String,
    pub source: Source,
    pub source_icon: String,
    /// Source-normalized popularity signal, clamped to 0-99
    pub popularity: u8,
    #[serde(rename = "tag")]
    pub version: VersionTag,
    /// Track length in seconds; 0 = unknown
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    /// Audio quality; known only for peer-network offers
    #[serde(default, skip_serializing_if = "AudioQuality::is_unknown")]
    pub quality: AudioQuality,
    /// File size; known only for peer-network offers
    #[serde(default, skip_serializing_if = "is_zero")]
    pub size_bytes: u64,
    /// Set during aggregation when the same title appears from
    /// multiple sources
    #[serde(default)]
    pub multi_source: bool,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Source adapter errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Command failed: {0}")]
    Command(String),
}

/// A search source normalized behind a common contract.
///
/// `search` returns at most [`RESULTS_PER_SOURCE`] candidates. Errors are
/// absorbed at the aggregation boundary; adapters themselves already map
/// "source has nothing for us" (missing token, empty response) to an
/// empty list rather than an error.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which source this adapter queries
    fn source(&self) -> Source;

    /// Search the source for a free-text query
    async fn search(&self, query: &str) -> Result<Vec<TrackCandidate>, SourceError>;
}

// ============================================================================
// Mock Adapter for Testing
// ============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use dj_common::version;

    /// Canned-response adapter for aggregator tests
    pub struct MockAdapter {
        source: Source,
        candidates: Vec<TrackCandidate>,
        fail: bool,
    }

    impl MockAdapter {
        pub fn returning(source: Source, candidates: Vec<TrackCandidate>) -> Self {
            Self {
                source,
                candidates,
                fail: false,
            }
        }

        pub fn failing(source: Source) -> Self {
            Self {
                source,
                candidates: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl SourceAdapter for MockAdapter {
        fn source(&self) -> Source {
            self.source
        }

        async fn search(&self, _query: &str) -> Result<Vec<TrackCandidate>, SourceError> {
            if self.fail {
                Err(SourceError::Network("mock failure".to_string()))
            } else {
                Ok(self.candidates.clone())
            }
        }
    }

    /// Minimal candidate for ranking tests
    pub fn candidate(source: Source, title: &str, popularity: u8) -> TrackCandidate {
        TrackCandidate {
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            artwork_url: String::new(),
            source,
            source_icon: source.icon().to_string(),
            popularity,
            version: version::classify(title),
            duration_seconds: 0,
            quality: AudioQuality::Unknown,
            size_bytes: 0,
            multi_source: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Spotify).unwrap(), "\"spotify\"");
        assert_eq!(serde_json::to_string(&Source::Soulseek).unwrap(), "\"soulseek\"");
    }

    #[test]
    fn test_candidate_wire_shape() {
        let candidate = TrackCandidate {
            title: "Track".to_string(),
            artist: "Artist".to_string(),
            artwork_url: "https://example.com/art.jpg".to_string(),
            source: Source::Spotify,
            source_icon: Source::Spotify.icon().to_string(),
            popularity: 80,
            version: VersionTag::Original,
            duration_seconds: 200,
            quality: AudioQuality::Unknown,
            size_bytes: 0,
            multi_source: false,
        };

        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["art"], "https://example.com/art.jpg");
        assert_eq!(value["sourceIcon"], Source::Spotify.icon());
        assert_eq!(value["tag"], "Original");
        assert_eq!(value["duration"], 200);
        // Catalog candidates carry no file fields
        assert!(value.get("quality").is_none());
        assert!(value.get("sizeBytes").is_none());
    }

    #[test]
    fn test_candidate_wire_shape_with_file_fields() {
        let candidate = TrackCandidate {
            title: "Track".to_string(),
            artist: "peer".to_string(),
            artwork_url: String::new(),
            source: Source::Soulseek,
            source_icon: Source::Soulseek.icon().to_string(),
            popularity: 90,
            version: VersionTag::Original,
            duration_seconds: 0,
            quality: AudioQuality::Flac,
            size_bytes: 30_000_000,
            multi_source: false,
        };

        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["quality"], "FLAC");
        assert_eq!(value["sizeBytes"], 30_000_000u64);
    }
}
