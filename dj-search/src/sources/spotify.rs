//! Spotify catalog search client
//!
//! Client-credentials token exchange with an expiry-cached bearer token;
//! searches the track catalog and keeps the two most popular hits.

use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::sources::{Source, SourceAdapter, SourceError, TrackCandidate, RESULTS_PER_SOURCE};
use dj_common::version;

const ACCOUNTS_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const SEARCH_URL: &str = "https://api.spotify.com/v1/search";
const USER_AGENT: &str = "dj-search/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 10;
/// Candidates fetched per query before popularity ranking
const SEARCH_LIMIT: u8 = 6;
/// Refresh the token this long before the server-side expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    items: Vec<CatalogTrack>,
}

#[derive(Debug, Deserialize)]
struct CatalogTrack {
    name: String,
    popularity: u8,
    duration_ms: u64,
    artists: Vec<CatalogArtist>,
    album: CatalogAlbum,
}

#[derive(Debug, Deserialize)]
struct CatalogArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CatalogAlbum {
    #[serde(default)]
    images: Vec<CatalogImage>,
}

#[derive(Debug, Deserialize)]
struct CatalogImage {
    url: String,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Spotify search adapter with per-instance token cache.
///
/// Refresh is idempotent: two concurrent refreshes at worst perform two
/// token grants, with the last writer winning.
pub struct SpotifyAdapter {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_cache: Mutex<Option<CachedToken>>,
}

impl SpotifyAdapter {
    pub fn new(client_id: String, client_secret: String) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            client_id,
            client_secret,
            token_cache: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, refreshing the cache if expired
    async fn bearer_token(&self) -> Result<String, SourceError> {
        let mut cache = self.token_cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }

        tracing::debug!("refreshing Spotify access token");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(ACCOUNTS_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), body));
        }

        let grant: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(grant.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cache = Some(CachedToken {
            token: grant.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(grant.access_token)
    }
}

/// Rank catalog hits by native popularity and normalize the top two
fn normalize(mut items: Vec<CatalogTrack>) -> Vec<TrackCandidate> {
    items.sort_by(|a, b| b.popularity.cmp(&a.popularity));

    items
        .into_iter()
        .take(RESULTS_PER_SOURCE)
        .map(|track| {
            let artist = track
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let artwork_url = track
                .album
                .images
                .first()
                .map(|i| i.url.clone())
                .unwrap_or_default();

            TrackCandidate {
                version: version::classify(&track.name),
                artist,
                artwork_url,
                source: Source::Spotify,
                source_icon: Source::Spotify.icon().to_string(),
                popularity: track.popularity.min(99),
                duration_seconds: (track.duration_ms + 500) / 1000,
                quality: Default::default(),
                size_bytes: 0,
                multi_source: false,
                title: track.name,
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl SourceAdapter for SpotifyAdapter {
    fn source(&self) -> Source {
        Source::Spotify
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackCandidate>, SourceError> {
        let token = self.bearer_token().await?;

        let limit = SEARCH_LIMIT.to_string();
        let response = self
            .http_client
            .get(SEARCH_URL)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), body));
        }

        let page: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(normalize(page.tracks.items))
    }
}
