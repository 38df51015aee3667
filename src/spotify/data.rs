//! User-scoped Spotify Web API reads: top items, single items and profile.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use super::auth::{AuthError, TokenRefresher};
use super::models::{
    decode_item, ItemType, MusicItem, RawProfile, Refreshed, TimeRange, TokenPair,
    TopItemsPage, UserProfile,
};
use super::retry::with_refresh;
use crate::transport::{RequestOptions, Transport, TransportError};

#[derive(Debug, Error)]
pub enum MusicError {
    #[error("request to Spotify API failed - {0}")]
    Transport(#[from] TransportError),

    #[error("failed to refresh access token - {0}")]
    Refresh(#[from] AuthError),

    #[error("requested item not found - {0}")]
    NotFound(String),

    #[error("invalid Spotify response data - {0}")]
    InvalidData(String),
}

impl MusicError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, MusicError::Transport(e) if e.is_unauthorized())
    }
}

/// Read access to a user's music data.
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    async fn get_top_items(
        &self,
        tokens: &TokenPair,
        item_type: ItemType,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Refreshed<Vec<MusicItem>>, MusicError>;

    async fn get_item_by_id(
        &self,
        id: &str,
        tokens: &TokenPair,
        item_type: ItemType,
    ) -> Result<Refreshed<MusicItem>, MusicError>;

    async fn get_profile(&self, tokens: &TokenPair) -> Result<Refreshed<UserProfile>, MusicError>;
}

pub struct SpotifyData {
    transport: Transport,
    base_url: String,
    refresher: Arc<dyn TokenRefresher>,
    timeout: Duration,
}

impl SpotifyData {
    pub fn new(
        transport: Transport,
        base_url: String,
        refresher: Arc<dyn TokenRefresher>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            base_url,
            refresher,
            timeout,
        }
    }

    async fn fetch(
        &self,
        url: &str,
        options: RequestOptions,
        access_token: &str,
    ) -> Result<serde_json::Value, MusicError> {
        let options = options.bearer(access_token).timeout(self.timeout);
        Ok(self.transport.get(url, &options).await?)
    }

    async fn fetch_top_items(
        &self,
        access_token: &str,
        item_type: ItemType,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<MusicItem>, MusicError> {
        let url = format!("{}/me/top/{}", self.base_url, item_type);
        let options = RequestOptions::new()
            .query("time_range", time_range.as_str())
            .query("limit", limit);

        let value = self.fetch(&url, options, access_token).await?;
        let page: TopItemsPage = serde_json::from_value(value)
            .map_err(|e| MusicError::InvalidData(format!("top {} page: {}", item_type, e)))?;

        page.items
            .into_iter()
            .map(|item| decode_item(item, item_type).map_err(MusicError::InvalidData))
            .collect()
    }

    async fn fetch_item(
        &self,
        access_token: &str,
        id: &str,
        item_type: ItemType,
    ) -> Result<MusicItem, MusicError> {
        let url = format!("{}/{}/{}", self.base_url, item_type, urlencoding::encode(id));
        let value = self.fetch(&url, RequestOptions::new(), access_token).await?;
        decode_item(value, item_type).map_err(MusicError::InvalidData)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, MusicError> {
        let url = format!("{}/me", self.base_url);
        let value = self.fetch(&url, RequestOptions::new(), access_token).await?;
        let raw: RawProfile = serde_json::from_value(value)
            .map_err(|e| MusicError::InvalidData(format!("profile: {}", e)))?;
        Ok(raw.into())
    }
}

#[async_trait]
impl MusicCatalog for SpotifyData {
    async fn get_top_items(
        &self,
        tokens: &TokenPair,
        item_type: ItemType,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Refreshed<Vec<MusicItem>>, MusicError> {
        let result = with_refresh(self.refresher.as_ref(), tokens, |access_token| async move {
            self.fetch_top_items(&access_token, item_type, time_range, limit)
                .await
        })
        .await?;

        debug!("fetched {} top {}", result.data.len(), item_type);
        Ok(result)
    }

    async fn get_item_by_id(
        &self,
        id: &str,
        tokens: &TokenPair,
        item_type: ItemType,
    ) -> Result<Refreshed<MusicItem>, MusicError> {
        with_refresh(self.refresher.as_ref(), tokens, |access_token| async move {
            self.fetch_item(&access_token, id, item_type).await
        })
        .await
        .map_err(|e| match e {
            MusicError::Transport(t) if t.is_not_found() => {
                MusicError::NotFound(format!("ID: {}, type: {}", id, item_type))
            }
            other => other,
        })
    }

    async fn get_profile(&self, tokens: &TokenPair) -> Result<Refreshed<UserProfile>, MusicError> {
        with_refresh(self.refresher.as_ref(), tokens, |access_token| async move {
            self.fetch_profile(&access_token).await
        })
        .await
    }
}
