//! SoundCloud discovery via search-engine scrape
//!
//! There is no keyless SoundCloud search API, so this adapter fetches
//! DuckDuckGo's HTML endpoint scoped to soundcloud.com and extracts
//! canonical track-page URLs. Title and artist are reformatted URL path
//! segments; inherently noisy, best effort.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::time::Duration;

use crate::sources::{Source, SourceAdapter, SourceError, TrackCandidate, RESULTS_PER_SOURCE};
use dj_common::version;

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";
const REQUEST_TIMEOUT_SECS: u64 = 8;
/// No native ranking signal is available from a scrape
const FIXED_POPULARITY: u8 = 40;

/// Canonical track page: soundcloud.com/{artist}/{permalink}
static TRACK_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https://soundcloud\.com/[a-zA-Z0-9_-]+/[a-zA-Z0-9_-]+").unwrap());

/// SoundCloud scrape adapter
pub struct SoundcloudAdapter {
    http_client: reqwest::Client,
}

impl SoundcloudAdapter {
    pub fn new() -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }
}

/// Uppercase the first letter of every word ("some-slug" pre-split)
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract track candidates from a search-result HTML page.
///
/// Playlist, tag, and likes URLs are filtered out; duplicates are
/// dropped; the first two surviving pages win.
fn extract_candidates(html: &str) -> Vec<TrackCandidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for found in TRACK_URL.find_iter(html) {
        let url = found.as_str();
        if url.contains("/sets/") || url.contains("/tags/") || url.contains("/likes") {
            continue;
        }
        if !seen.insert(url.to_string()) {
            continue;
        }

        let mut segments = url.trim_end_matches('/').rsplit('/');
        let title_slug = segments.next().unwrap_or_default();
        let artist_slug = segments.next().unwrap_or_default();

        let title = title_case(&title_slug.replace('-', " "));
        let artist = title_case(&artist_slug.replace('-', " "));

        candidates.push(TrackCandidate {
            version: version::classify(&title),
            artist,
            artwork_url: String::new(),
            source: Source::Soundcloud,
            source_icon: Source::Soundcloud.icon().to_string(),
            popularity: FIXED_POPULARITY,
            duration_seconds: 0,
            quality: Default::default(),
            size_bytes: 0,
            multi_source: false,
            title,
        });

        if candidates.len() >= RESULTS_PER_SOURCE {
            break;
        }
    }

    candidates
}

#[async_trait::async_trait]
impl SourceAdapter for SoundcloudAdapter {
    fn source(&self) -> Source {
        Source::Soundcloud
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackCandidate>, SourceError> {
        let scoped_query = format!("{} site:soundcloud.com", query);

        let response = self
            .http_client
            .get(SEARCH_ENDPOINT)
            .query(&[("q", scoped_query.as_str())])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), body));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(extract_candidates(&html))
    }
}
