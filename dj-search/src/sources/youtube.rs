//! YouTube search via yt-dlp
//!
//! Invokes yt-dlp in flat-playlist mode; it emits one JSON object per
//! line. Malformed lines are skipped, not fatal. View counts are mapped
//! onto the shared 0-99 popularity scale.

use serde::Deserialize;
use std::process::Command;
use std::time::Duration;

use crate::config::YoutubeConfig;
use crate::sources::{Source, SourceAdapter, SourceError, TrackCandidate, RESULTS_PER_SOURCE};
use dj_common::version;

/// How many entries yt-dlp is asked for (`ytsearchN:`)
const SEARCH_COUNT: usize = 3;
/// Popularity when the view count is missing or rounds to zero
const DEFAULT_POPULARITY: u8 = 50;
/// One popularity point per this many views, capped at 99
const VIEWS_PER_POINT: u64 = 100_000;

#[derive(Debug, Deserialize)]
struct FlatEntry {
    title: Option<String>,
    fulltitle: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    thumbnail: Option<String>,
    view_count: Option<u64>,
    duration: Option<f64>,
}

/// YouTube search adapter shelling out to yt-dlp
pub struct YoutubeAdapter {
    binary: String,
    timeout: Duration,
}

impl YoutubeAdapter {
    pub fn new(config: YoutubeConfig) -> Self {
        Self {
            binary: config.binary,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Map a raw view count onto the 0-99 popularity scale
fn view_count_popularity(view_count: Option<u64>) -> u8 {
    let rounded = (view_count.unwrap_or(0) + VIEWS_PER_POINT / 2) / VIEWS_PER_POINT;
    match rounded.min(99) as u8 {
        0 => DEFAULT_POPULARITY,
        points => points,
    }
}

/// Parse yt-dlp's line-per-object output into candidates
fn parse_flat_entries(raw: &str, query: &str) -> Vec<TrackCandidate> {
    raw.lines()
        .filter_map(|line| match serde_json::from_str::<FlatEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed yt-dlp line");
                None
            }
        })
        .take(RESULTS_PER_SOURCE)
        .map(|entry| {
            let title = entry
                .title
                .or(entry.fulltitle)
                .unwrap_or_else(|| query.to_string());
            let artist = entry.channel.or(entry.uploader).unwrap_or_default();

            TrackCandidate {
                version: version::classify(&title),
                artist,
                artwork_url: entry.thumbnail.unwrap_or_default(),
                source: Source::Youtube,
                source_icon: Source::Youtube.icon().to_string(),
                popularity: view_count_popularity(entry.view_count),
                duration_seconds: entry.duration.map(|d| d.round() as u64).unwrap_or(0),
                quality: Default::default(),
                size_bytes: 0,
                multi_source: false,
                title,
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl SourceAdapter for YoutubeAdapter {
    fn source(&self) -> Source {
        Source::Youtube
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackCandidate>, SourceError> {
        let target = format!("ytsearch{}:{}", SEARCH_COUNT, query);
        let binary = self.binary.clone();

        let output = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || {
                Command::new(&binary)
                    .args(["--dump-json", "--no-download", "--flat-playlist"])
                    .arg(&target)
                    .output()
            }),
        )
        .await
        .map_err(|_| SourceError::Command("yt-dlp timed out".to_string()))?
        .map_err(|e| SourceError::Command(format!("task join error: {}", e)))?
        .map_err(|e| SourceError::Command(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Command(format!(
                "yt-dlp exit {:?}: {}",
                output.status.code(),
                stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_flat_entries(&stdout, query))
    }
}
