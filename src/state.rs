//! Shared handler state, built once at start-up.

use std::sync::Arc;

use reqwest::Client;

use crate::analysis::AnalysisService;
use crate::config::Config;
use crate::insights::InsightsService;
use crate::lyrics::LyricsService;
use crate::spotify::{MusicCatalog, SpotifyAuth, SpotifyData};
use crate::transport::Transport;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<SpotifyAuth>,
    pub music: Arc<dyn MusicCatalog>,
    pub insights: Arc<InsightsService>,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wire every gateway to the same HTTP client so they share one connection
    /// pool.
    pub fn new(config: &Config, client: Client) -> Self {
        let transport = Transport::new(client);

        let auth = Arc::new(SpotifyAuth::new(transport.clone(), config.oauth_settings()));
        let music: Arc<dyn MusicCatalog> = Arc::new(SpotifyData::new(
            transport.clone(),
            config.spotify_data_base_url.clone(),
            auth.clone(),
            config.request_timeout,
        ));
        let lyrics = Arc::new(LyricsService::new(
            transport.clone(),
            config.lyrics_base_url.clone(),
            config.analysis_timeout,
        ));
        let analysis = Arc::new(AnalysisService::new(
            transport,
            config.analysis_base_url.clone(),
            config.analysis_timeout,
        ));
        let insights = Arc::new(InsightsService::new(music.clone(), lyrics, analysis));

        Self {
            auth,
            music,
            insights,
            cookie_secure: config.cookie_secure,
        }
    }
}
