//! dj-search - Multi-Source Track Search microservice
//!
//! Queries the streaming catalog, video platform, web-scraped content
//! index, and peer network in parallel; serves ranked, duplicate-flagged
//! track candidates over HTTP for the DJ dashboard.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use dj_search::aggregator::Aggregator;
use dj_search::config::SearchConfig;
use dj_search::sources::soulseek::SoulseekAdapter;
use dj_search::sources::soundcloud::SoundcloudAdapter;
use dj_search::sources::spotify::SpotifyAdapter;
use dj_search::sources::youtube::YoutubeAdapter;
use dj_search::sources::SourceAdapter;
use dj_search::AppState;

#[derive(Debug, Parser)]
#[command(name = "dj-search", about = "Multi-source track search service")]
struct Args {
    /// Path to TOML configuration file
    #[arg(long, env = "DJ_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address from configuration
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting dj-search (Multi-Source Track Search)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = SearchConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if config.spotify.is_configured() {
        adapters.push(Arc::new(SpotifyAdapter::new(
            config.spotify.client_id.clone(),
            config.spotify.client_secret.clone(),
        )?));
    } else {
        warn!("Spotify credentials not configured; catalog source disabled");
    }

    adapters.push(Arc::new(YoutubeAdapter::new(config.youtube.clone())));
    adapters.push(Arc::new(SoundcloudAdapter::new()?));

    let slskd = if config.slskd.is_configured() {
        Some(Arc::new(SoulseekAdapter::new(config.slskd.clone())?))
    } else {
        warn!("slskd credentials not configured; peer-network source disabled");
        None
    };
    if let Some(adapter) = &slskd {
        adapters.push(Arc::clone(adapter) as Arc<dyn SourceAdapter>);
    }

    info!("Active sources: {}", adapters.len());

    let state = AppState::new(Arc::new(Aggregator::new(adapters)), slskd);
    let app = dj_search::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Listening on http://{}", config.server.bind_addr);
    info!("Endpoints: GET /search?q=QUERY, GET /health");

    axum::serve(listener, app).await?;

    Ok(())
}
