//! Emotional insights over a user's top tracks.
//!
//! Pipeline: top tracks -> lyrics (one batched call) -> emotional profile per
//! track (concurrent, partial tolerant) -> aggregate, average, rank. Stages run
//! strictly in sequence and the first failing stage ends the request.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::{
    AnalysisError, AnalysisRequest, EmotionAnalyzer, EmotionalProfile, TaggedLyrics,
};
use crate::emotion::Emotion;
use crate::lyrics::{LyricsError, LyricsRequest, LyricsSource};
use crate::spotify::{ItemType, MusicCatalog, MusicError, Refreshed, TimeRange, TokenPair};

/// Number of top tracks sampled for an emotional profile.
pub const DEFAULT_TRACK_SAMPLE: u32 = 50;

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),

    #[error("no top tracks found for the user")]
    NoTopTracks,

    #[error("no lyrics found for the user's top tracks")]
    NoLyrics,

    #[error("emotional analysis failed for all {attempted} tracks - {cause}")]
    NoProfiles { attempted: usize, cause: String },

    #[error("no lyrics found for track {0}")]
    MissingLyrics(String),

    #[error("item {0} is not a track")]
    NotATrack(String),

    #[error("failed to retrieve music data - {0}")]
    Music(#[from] MusicError),

    #[error("failed to retrieve lyrics - {0}")]
    Lyrics(#[from] LyricsError),

    #[error("failed to analyse lyrics - {0}")]
    Analysis(#[from] AnalysisError),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopEmotion {
    pub name: Emotion,
    pub percentage: f64,
    /// Track with the highest score for this emotion, not the source of the
    /// average.
    pub track_id: String,
}

/// Running totals for one emotion across profiles.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct EmotionTally {
    pub total: f64,
    pub max_track_id: Option<String>,
    pub max_value: f64,
}

/// Sum scores and remember the highest-scoring track per emotion. The result
/// is in vocabulary order. Only a strictly greater score replaces the current
/// maximum, so the first track wins ties and an emotion nobody scored above
/// zero keeps `max_track_id == None`.
pub(crate) fn aggregate(profiles: &[EmotionalProfile]) -> Vec<(Emotion, EmotionTally)> {
    let mut tallies: Vec<(Emotion, EmotionTally)> = Emotion::ALL
        .iter()
        .map(|&e| (e, EmotionTally::default()))
        .collect();

    for profile in profiles {
        for (emotion, tally) in tallies.iter_mut() {
            let score = profile.emotion_scores.get(*emotion);
            tally.total += score;
            if score > tally.max_value {
                tally.max_value = score;
                tally.max_track_id = Some(profile.track_id.clone());
            }
        }
    }

    tallies
}

/// Two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Average each contributing emotion over `profile_count` profiles.
pub(crate) fn average(
    tallies: Vec<(Emotion, EmotionTally)>,
    profile_count: usize,
) -> Vec<TopEmotion> {
    if profile_count == 0 {
        return vec![];
    }

    tallies
        .into_iter()
        .filter_map(|(name, tally)| {
            tally.max_track_id.map(|track_id| TopEmotion {
                name,
                percentage: round2(tally.total / profile_count as f64),
                track_id,
            })
        })
        .collect()
}

/// Sort by percentage descending and keep the first `limit`. The sort is
/// stable, so equal percentages stay in vocabulary order.
pub(crate) fn rank(mut emotions: Vec<TopEmotion>, limit: usize) -> Vec<TopEmotion> {
    emotions.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    emotions.truncate(limit);
    emotions
}

/// Aggregate, average and rank a set of profiles.
pub fn top_emotions(profiles: &[EmotionalProfile], limit: usize) -> Vec<TopEmotion> {
    rank(average(aggregate(profiles), profiles.len()), limit)
}

pub struct InsightsService {
    music: Arc<dyn MusicCatalog>,
    lyrics: Arc<dyn LyricsSource>,
    analysis: Arc<dyn EmotionAnalyzer>,
    track_sample: u32,
}

impl InsightsService {
    pub fn new(
        music: Arc<dyn MusicCatalog>,
        lyrics: Arc<dyn LyricsSource>,
        analysis: Arc<dyn EmotionAnalyzer>,
    ) -> Self {
        Self {
            music,
            lyrics,
            analysis,
            track_sample: DEFAULT_TRACK_SAMPLE,
        }
    }

    pub fn with_track_sample(mut self, track_sample: u32) -> Self {
        self.track_sample = track_sample;
        self
    }

    /// The user's `limit` most prominent emotions over their top tracks, with
    /// the tokens that are current after the Spotify call.
    pub async fn get_top_emotions(
        &self,
        tokens: &TokenPair,
        limit: i64,
        time_range: TimeRange,
    ) -> Result<Refreshed<Vec<TopEmotion>>, InsightsError> {
        let limit = usize::try_from(limit)
            .ok()
            .filter(|l| *l > 0)
            .ok_or(InsightsError::InvalidLimit(limit))?;

        let top = self
            .music
            .get_top_items(tokens, ItemType::Tracks, time_range, self.track_sample)
            .await?;
        let tokens = top.tokens;

        let lyrics_requests: Vec<LyricsRequest> = top
            .data
            .iter()
            .filter_map(|item| item.as_track())
            .map(|track| LyricsRequest {
                track_id: track.id.clone(),
                artist_name: track.artist.name.clone(),
                track_title: track.name.clone(),
            })
            .collect();
        if lyrics_requests.is_empty() {
            return Err(InsightsError::NoTopTracks);
        }

        let lyrics_list = self.lyrics.get_lyrics_list(&lyrics_requests).await?;
        let analysis_requests: Vec<AnalysisRequest> = lyrics_list
            .into_iter()
            .filter_map(|record| {
                record
                    .lyrics
                    .filter(|l| !l.trim().is_empty())
                    .map(|lyrics| AnalysisRequest {
                        track_id: record.track_id,
                        lyrics,
                    })
            })
            .collect();
        if analysis_requests.is_empty() {
            return Err(InsightsError::NoLyrics);
        }
        info!(
            "found lyrics for {}/{} top tracks",
            analysis_requests.len(),
            lyrics_requests.len()
        );

        let batch = self.analysis.get_emotional_profiles(analysis_requests).await;
        for failure in &batch.failures {
            warn!(
                "dropping track {} from analysis: {}",
                failure.track_id, failure.error
            );
        }
        if batch.profiles.is_empty() {
            let cause = batch
                .failures
                .first()
                .map(|f| f.error.to_string())
                .unwrap_or_else(|| "no profiles returned".to_string());
            return Err(InsightsError::NoProfiles {
                attempted: batch.failures.len(),
                cause,
            });
        }

        Ok(Refreshed {
            data: top_emotions(&batch.profiles, limit),
            tokens,
        })
    }

    /// The lyrics of one track with the spans expressing `emotion` marked up.
    pub async fn tag_lyrics_with_emotion(
        &self,
        track_id: &str,
        emotion: Emotion,
        tokens: &TokenPair,
    ) -> Result<Refreshed<TaggedLyrics>, InsightsError> {
        let item = self
            .music
            .get_item_by_id(track_id, tokens, ItemType::Tracks)
            .await?;
        let track = item
            .data
            .as_track()
            .ok_or_else(|| InsightsError::NotATrack(track_id.to_string()))?;

        let request = LyricsRequest {
            track_id: track.id.clone(),
            artist_name: track.artist.name.clone(),
            track_title: track.name.clone(),
        };
        let lyrics = self
            .lyrics
            .get_lyrics_list(std::slice::from_ref(&request))
            .await?
            .into_iter()
            .find(|record| record.track_id == request.track_id)
            .and_then(|record| record.lyrics)
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| InsightsError::MissingLyrics(track_id.to_string()))?;

        let tagged = self
            .analysis
            .get_emotional_tags(&request.track_id, &lyrics, emotion)
            .await?;

        Ok(Refreshed {
            data: tagged,
            tokens: item.tokens,
        })
    }
}
