//! Client for the lyrics microservice.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::transport::{RequestOptions, Transport, TransportError};

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("request to lyrics service failed - {0}")]
    Transport(#[from] TransportError),

    #[error("invalid lyrics response data - {0}")]
    InvalidData(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LyricsRequest {
    pub track_id: String,
    pub artist_name: String,
    pub track_title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LyricsRecord {
    pub track_id: String,
    pub artist_name: String,
    pub track_title: String,
    /// `None` when the service found no lyrics for the track.
    pub lyrics: Option<String>,
}

#[async_trait]
pub trait LyricsSource: Send + Sync {
    async fn get_lyrics_list(
        &self,
        requests: &[LyricsRequest],
    ) -> Result<Vec<LyricsRecord>, LyricsError>;
}

pub struct LyricsService {
    transport: Transport,
    base_url: String,
    timeout: Duration,
}

impl LyricsService {
    pub fn new(transport: Transport, base_url: String, timeout: Duration) -> Self {
        Self {
            transport,
            base_url,
            timeout,
        }
    }
}

#[async_trait]
impl LyricsSource for LyricsService {
    /// One batched call for all tracks. A single malformed entry fails the
    /// whole batch.
    async fn get_lyrics_list(
        &self,
        requests: &[LyricsRequest],
    ) -> Result<Vec<LyricsRecord>, LyricsError> {
        if requests.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/lyrics-list", self.base_url);
        let options = RequestOptions::new().timeout(self.timeout);

        let value = self.transport.post_json(&url, &options, requests).await?;
        let records: Vec<LyricsRecord> = serde_json::from_value(value)
            .map_err(|e| LyricsError::InvalidData(e.to_string()))?;

        debug!(
            "lyrics service returned {} records for {} requests",
            records.len(),
            requests.len()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;

    use super::*;

    fn unreachable_service() -> LyricsService {
        LyricsService::new(
            Transport::new(Client::new()),
            "http://127.0.0.1:1".into(),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn empty_request_makes_no_call() {
        let records = unreachable_service().get_lyrics_list(&[]).await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let request = LyricsRequest {
            track_id: "t1".into(),
            artist_name: "Artist".into(),
            track_title: "Song".into(),
        };

        let err = unreachable_service()
            .get_lyrics_list(&[request])
            .await
            .unwrap_err();

        assert!(matches!(err, LyricsError::Transport(_)));
    }

    #[test]
    fn missing_lyrics_decode_as_none() {
        let record: LyricsRecord = serde_json::from_str(
            r#"{"track_id":"t1","artist_name":"A","track_title":"S","lyrics":null}"#,
        )
        .unwrap();

        assert_eq!(record.lyrics, None);
    }
}
