//! Soulseek peer search via the slskd REST API
//!
//! Session-token flow: create a session, start a search job, let the
//! collection window run so peers can respond, read back the accumulated
//! offers, then delete the job server-side. Deletion is fired on a
//! detached task so a caller-side timeout cannot cancel it.
//!
//! The collection window always runs to completion; returning on the
//! first response would cost result completeness.

use serde::Deserialize;
use std::time::Duration;

use crate::config::SlskdConfig;
use crate::sources::{Source, SourceAdapter, SourceError, TrackCandidate, RESULTS_PER_SOURCE};
use dj_common::quality::AudioQuality;
use dj_common::version;

const SESSION_PATH: &str = "/api/v0/session";
const SEARCHES_PATH: &str = "/api/v0/searches";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);
/// Offer score weights: quality tier dominates, size breaks ties
const QUALITY_TIER_WEIGHT: u8 = 25;
const SIZE_POINT_BYTES: u64 = 2_000_000;
const MAX_SIZE_POINTS: u64 = 25;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct SearchJob {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PeerResponse {
    username: Option<String>,
    #[serde(default)]
    files: Vec<PeerFile>,
}

#[derive(Debug, Deserialize)]
struct PeerFile {
    filename: Option<String>,
    #[serde(default)]
    size: u64,
}

/// Soulseek search adapter backed by a slskd daemon
pub struct SoulseekAdapter {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    collection_window: Duration,
}

impl SoulseekAdapter {
    pub fn new(config: SlskdConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
            collection_window: Duration::from_secs(config.collection_window_secs),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Short-timeout reachability probe against the daemon root
    pub async fn is_healthy(&self) -> bool {
        self.http_client
            .get(format!("{}/", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    /// Authenticate; an auth rejection or token-less body is "no
    /// results", not a fault
    async fn create_session(&self) -> Result<Option<String>, SourceError> {
        let body = serde_json::json!({
            "username": self.username,
            "password": self.password,
        });

        let response = self
            .http_client
            .post(self.endpoint(SESSION_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "slskd session rejected");
            return Ok(None);
        }

        Ok(response
            .json::<SessionResponse>()
            .await
            .ok()
            .map(|session| session.token))
    }

    async fn start_search(&self, token: &str, query: &str) -> Result<Option<String>, SourceError> {
        let body = serde_json::json!({ "searchText": query });

        let response = self
            .http_client
            .post(self.endpoint(SEARCHES_PATH))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "slskd search not started");
            return Ok(None);
        }

        Ok(response
            .json::<SearchJob>()
            .await
            .ok()
            .map(|job| job.id))
    }

    /// Fetch accumulated peer responses; an unparsable body is treated
    /// as no results
    async fn fetch_responses(
        &self,
        token: &str,
        job_id: &str,
    ) -> Result<Vec<PeerResponse>, SourceError> {
        let url = self.endpoint(&format!("{}/{}/responses", SEARCHES_PATH, job_id));

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        match response.json::<Vec<PeerResponse>>().await {
            Ok(responses) => Ok(responses),
            Err(e) => {
                tracing::debug!(error = %e, "slskd responses not a peer list");
                Ok(Vec::new())
            }
        }
    }

    /// Delete the search job on a detached task, so cleanup runs even if
    /// the caller stops waiting on the search future
    fn spawn_delete(&self, token: &str, job_id: &str) {
        let client = self.http_client.clone();
        let url = self.endpoint(&format!("{}/{}", SEARCHES_PATH, job_id));
        let token = token.to_string();

        tokio::spawn(async move {
            if let Err(e) = client.delete(&url).bearer_auth(&token).send().await {
                tracing::warn!(error = %e, "slskd search job cleanup failed");
            }
        });
    }
}

/// Score one peer file offer on the shared 0-99 popularity scale
fn offer_score(quality: AudioQuality, size_bytes: u64) -> u8 {
    let size_points =
        ((size_bytes + SIZE_POINT_BYTES / 2) / SIZE_POINT_BYTES).min(MAX_SIZE_POINTS) as u8;
    (quality.tier() * QUALITY_TIER_WEIGHT + size_points).min(99)
}

/// Flatten peer offers to audio-file candidates, ranked by offer score
fn rank_offers(responses: Vec<PeerResponse>) -> Vec<TrackCandidate> {
    let mut candidates = Vec::new();

    for response in responses {
        let peer = response.username.unwrap_or_default();

        for file in response.files {
            let Some(filename) = file.filename else {
                continue;
            };

            let quality = AudioQuality::from_filename(&filename);
            if quality.is_unknown() {
                continue;
            }

            let basename = filename
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(filename.as_str());
            let title = basename
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(basename)
                .replace('_', " ");

            candidates.push(TrackCandidate {
                version: version::classify(&title),
                artist: peer.clone(),
                artwork_url: String::new(),
                source: Source::Soulseek,
                source_icon: Source::Soulseek.icon().to_string(),
                popularity: offer_score(quality, file.size),
                duration_seconds: 0,
                quality,
                size_bytes: file.size,
                multi_source: false,
                title,
            });
        }
    }

    candidates.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    candidates.truncate(RESULTS_PER_SOURCE);
    candidates
}

#[async_trait::async_trait]
impl SourceAdapter for SoulseekAdapter {
    fn source(&self) -> Source {
        Source::Soulseek
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackCandidate>, SourceError> {
        let Some(token) = self.create_session().await? else {
            return Ok(Vec::new());
        };

        let Some(job_id) = self.start_search(&token, query).await? else {
            return Ok(Vec::new());
        };

        // Let peers respond for the full window; no early exit.
        tokio::time::sleep(self.collection_window).await;

        let responses = self.fetch_responses(&token, &job_id).await;

        // Cleanup is independent of whether retrieval succeeded.
        self.spawn_delete(&token, &job_id);

        Ok(rank_offers(responses?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(username: &str, files: Vec<(&str, u64)>) -> PeerResponse {
        PeerResponse {
            username: Some(username.to_string()),
            files: files
                .into_iter()
                .map(|(filename, size)| PeerFile {
                    filename: Some(filename.to_string()),
                    size,
                })
                .collect(),
        }
    }

    #[test]
    fn test_offer_score_weights_quality_over_size() {
        let big_mp3 = offer_score(AudioQuality::Mp3, 50_000_000);
        let small_wav = offer_score(AudioQuality::Wav, 1_000_000);
        assert!(small_wav > big_mp3);
    }

    #[test]
    fn test_offer_score_size_points_capped() {
        // 25 quality-tier points per tier + at most 25 size points
        assert_eq!(offer_score(AudioQuality::Flac, 500_000_000), 75);
        assert_eq!(offer_score(AudioQuality::Mp3, 10_000_000), 30);
    }

    #[test]
    fn test_offer_score_clamped_to_popularity_range() {
        assert!(offer_score(AudioQuality::Wav, 500_000_000) <= 99);
    }

    #[test]
    fn test_rank_offers_filters_non_audio() {
        let responses = vec![offer(
            "peer1",
            vec![("folder\\cover.jpg", 100_000), ("folder\\track.mp3", 8_000_000)],
        )];

        let candidates = rank_offers(responses);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].quality, AudioQuality::Mp3);
    }

    #[test]
    fn test_rank_offers_orders_by_score_and_caps() {
        let responses = vec![
            offer("peer1", vec![("a.mp3", 8_000_000)]),
            offer("peer2", vec![("b.wav", 40_000_000), ("c.flac", 30_000_000)]),
        ];

        let candidates = rank_offers(responses);
        assert_eq!(candidates.len(), RESULTS_PER_SOURCE);
        assert_eq!(candidates[0].quality, AudioQuality::Wav);
        assert_eq!(candidates[1].quality, AudioQuality::Flac);
    }

    #[test]
    fn test_rank_offers_title_from_basename() {
        let responses = vec![offer(
            "peer1",
            vec![("Music\\Artist\\Some_Great_Track.flac", 20_000_000)],
        )];

        let candidates = rank_offers(responses);
        assert_eq!(candidates[0].title, "Some Great Track");
        assert_eq!(candidates[0].artist, "peer1");
        assert_eq!(candidates[0].size_bytes, 20_000_000);
    }

    #[test]
    fn test_rank_offers_empty_input() {
        assert!(rank_offers(Vec::new()).is_empty());
    }

    #[test]
    fn test_peer_response_parsing_tolerates_missing_fields() {
        let json = r#"[{"files": [{"size": 123}]}, {"username": "peer"}]"#;
        let responses: Vec<PeerResponse> = serde_json::from_str(json).unwrap();
        assert!(rank_offers(responses).is_empty());
    }
}
