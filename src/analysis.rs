//! Client for the lyrics emotion-analysis microservice.
//!
//! Profiles are requested one track at a time, all tracks concurrently. A
//! failed track does not abort the others; the outcome of every request is
//! reported in an [`AnalysisBatch`].

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::emotion::{Emotion, EmotionScores};
use crate::transport::{RequestOptions, Transport, TransportError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("request to analysis service failed - {0}")]
    Transport(#[from] TransportError),

    #[error("invalid analysis response data - {0}")]
    InvalidData(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub track_id: String,
    pub lyrics: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmotionalProfile {
    pub track_id: String,
    pub lyrics: String,
    pub emotion_scores: EmotionScores,
}

/// Lyrics annotated with inline markup around the spans expressing `emotion`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaggedLyrics {
    pub track_id: String,
    pub emotion: Emotion,
    pub lyrics: String,
}

#[derive(Debug)]
pub struct AnalysisFailure {
    pub track_id: String,
    pub error: AnalysisError,
}

/// Outcome of a fan-out: the profiles that came back and the tracks that
/// failed. Callers decide whether a partial result is good enough.
#[derive(Debug, Default)]
pub struct AnalysisBatch {
    pub profiles: Vec<EmotionalProfile>,
    pub failures: Vec<AnalysisFailure>,
}

impl AnalysisBatch {
    pub fn requested(&self) -> usize {
        self.profiles.len() + self.failures.len()
    }
}

#[async_trait]
pub trait EmotionAnalyzer: Send + Sync {
    async fn get_emotional_profiles(&self, requests: Vec<AnalysisRequest>) -> AnalysisBatch;

    async fn get_emotional_tags(
        &self,
        track_id: &str,
        lyrics: &str,
        emotion: Emotion,
    ) -> Result<TaggedLyrics, AnalysisError>;
}

#[derive(Deserialize)]
struct ProfileResponse {
    track_id: String,
    lyrics: String,
    emotional_profile: EmotionScores,
}

#[derive(Serialize)]
struct TagsRequest<'a> {
    track_id: &'a str,
    lyrics: &'a str,
    emotion: Emotion,
}

pub struct AnalysisService {
    transport: Transport,
    base_url: String,
    timeout: Duration,
}

impl AnalysisService {
    pub fn new(transport: Transport, base_url: String, timeout: Duration) -> Self {
        Self {
            transport,
            base_url,
            timeout,
        }
    }

    /// Analyse a single set of lyrics.
    pub async fn get_emotional_profile(
        &self,
        request: &AnalysisRequest,
    ) -> Result<EmotionalProfile, AnalysisError> {
        let url = format!("{}/emotional-profile", self.base_url);
        let options = RequestOptions::new().timeout(self.timeout);

        let value = self.transport.post_json(&url, &options, request).await?;
        let body: ProfileResponse = serde_json::from_value(value)
            .map_err(|e| AnalysisError::InvalidData(e.to_string()))?;
        if body.track_id != request.track_id {
            return Err(AnalysisError::InvalidData(format!(
                "profile for track {} returned for track {}",
                body.track_id, request.track_id
            )));
        }
        body.emotional_profile
            .validate()
            .map_err(|e| AnalysisError::InvalidData(format!("track {}: {}", body.track_id, e)))?;

        Ok(EmotionalProfile {
            track_id: body.track_id,
            lyrics: body.lyrics,
            emotion_scores: body.emotional_profile,
        })
    }
}

#[async_trait]
impl EmotionAnalyzer for AnalysisService {
    async fn get_emotional_profiles(&self, requests: Vec<AnalysisRequest>) -> AnalysisBatch {
        let results = join_all(requests.iter().map(|request| async move {
            let result = self.get_emotional_profile(request).await;
            (request.track_id.clone(), result)
        }))
        .await;

        let mut batch = AnalysisBatch::default();
        for (track_id, result) in results {
            match result {
                Ok(profile) => batch.profiles.push(profile),
                Err(error) => {
                    debug!("analysis failed for track {}: {}", track_id, error);
                    batch.failures.push(AnalysisFailure { track_id, error });
                }
            }
        }

        info!(
            "retrieved analysis for {}/{} tracks",
            batch.profiles.len(),
            batch.requested()
        );
        batch
    }

    async fn get_emotional_tags(
        &self,
        track_id: &str,
        lyrics: &str,
        emotion: Emotion,
    ) -> Result<TaggedLyrics, AnalysisError> {
        let url = format!("{}/emotional-tags", self.base_url);
        let options = RequestOptions::new().timeout(self.timeout);
        let body = TagsRequest {
            track_id,
            lyrics,
            emotion,
        };

        let value = self.transport.post_json(&url, &options, &body).await?;
        serde_json::from_value(value).map_err(|e| AnalysisError::InvalidData(e.to_string()))
    }
}
