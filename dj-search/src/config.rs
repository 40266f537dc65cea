//! Configuration for the search service
//!
//! Resolution priority: CLI flag → environment variable → TOML file →
//! compiled default. Credentials are injected, never compiled in; a
//! source whose credentials are missing is disabled at startup rather
//! than failing the process.

use dj_common::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default wait for peer responses before reading a search job back
pub const DEFAULT_COLLECTION_WINDOW_SECS: u64 = 8;

/// Top-level service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub slskd: SlskdConfig,
    #[serde(default)]
    pub youtube: YoutubeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Catalog credentials for the client-credentials token exchange
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

impl SpotifyConfig {
    pub fn is_configured(&self) -> bool {
        is_valid_key(&self.client_id) && is_valid_key(&self.client_secret)
    }
}

/// slskd daemon connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct SlskdConfig {
    #[serde(default = "default_slskd_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// How long a search job accumulates peer responses before readback
    #[serde(default = "default_collection_window")]
    pub collection_window_secs: u64,
}

impl Default for SlskdConfig {
    fn default() -> Self {
        Self {
            base_url: default_slskd_url(),
            username: String::new(),
            password: String::new(),
            collection_window_secs: default_collection_window(),
        }
    }
}

impl SlskdConfig {
    pub fn is_configured(&self) -> bool {
        is_valid_key(&self.username) && is_valid_key(&self.password)
    }
}

/// yt-dlp invocation settings
#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeConfig {
    #[serde(default = "default_youtube_binary")]
    pub binary: String,
    #[serde(default = "default_youtube_timeout")]
    pub timeout_secs: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            binary: default_youtube_binary(),
            timeout_secs: default_youtube_timeout(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_slskd_url() -> String {
    "http://localhost:5893".to_string()
}

fn default_collection_window() -> u64 {
    DEFAULT_COLLECTION_WINDOW_SECS
}

fn default_youtube_binary() -> String {
    "yt-dlp".to_string()
}

fn default_youtube_timeout() -> u64 {
    12
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

impl SearchConfig {
    /// Load configuration from an optional TOML file, then apply
    /// environment-variable overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Read config failed: {}", e)))?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Parse config failed: {}", e)))?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("DJ_BIND_ADDR") {
            self.server.bind_addr = value;
        }
        if let Ok(value) = std::env::var("DJ_SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = value;
        }
        if let Ok(value) = std::env::var("DJ_SPOTIFY_CLIENT_SECRET") {
            self.spotify.client_secret = value;
        }
        if let Ok(value) = std::env::var("DJ_SLSKD_URL") {
            self.slskd.base_url = value;
        }
        if let Ok(value) = std::env::var("DJ_SLSKD_USERNAME") {
            self.slskd.username = value;
        }
        if let Ok(value) = std::env::var("DJ_SLSKD_PASSWORD") {
            self.slskd.password = value;
        }
    }
}
