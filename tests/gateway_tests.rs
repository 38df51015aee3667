//! Lyrics and analysis gateways against upstreams that break the data
//! contract.

mod common;

use std::time::Duration;

use axum::{routing::post, Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use spotify_insights::analysis::{
    AnalysisError, AnalysisRequest, AnalysisService, EmotionAnalyzer,
};
use spotify_insights::emotion::Emotion;
use spotify_insights::lyrics::{LyricsError, LyricsRequest, LyricsService, LyricsSource};
use spotify_insights::transport::Transport;

async fn lyrics_list(Json(requests): Json<Vec<Value>>) -> Json<Value> {
    let records: Vec<Value> = requests
        .into_iter()
        .map(|r| {
            if r["track_id"] == "broken" {
                json!({"track_id": "broken", "artist_name": r["artist_name"], "lyrics": "x"})
            } else {
                json!({
                    "track_id": r["track_id"],
                    "artist_name": r["artist_name"],
                    "track_title": r["track_title"],
                    "lyrics": "some words"
                })
            }
        })
        .collect();
    Json(Value::Array(records))
}

async fn emotional_profile(Json(request): Json<Value>) -> Json<Value> {
    let track_id = request["track_id"].as_str().unwrap_or_default();
    let lyrics = request["lyrics"].as_str().unwrap_or_default();
    let mut body = common::profile_json(track_id, lyrics, &[(Emotion::Joy, 0.9)]);

    match track_id {
        "partial" => {
            body["emotional_profile"]
                .as_object_mut()
                .unwrap()
                .remove("despair");
        }
        "unknown-key" => {
            body["emotional_profile"]["boredom"] = json!(0.1);
        }
        "out-of-range" => {
            body["emotional_profile"]["joy"] = json!(1.5);
        }
        "wrong-id" => {
            body["track_id"] = json!("someone-else");
        }
        _ => {}
    }
    Json(body)
}

async fn start() -> String {
    let app = Router::new()
        .route("/lyrics-list", post(lyrics_list))
        .route("/emotional-profile", post(emotional_profile));
    common::spawn(app).await
}

fn lyrics_request(track_id: &str) -> LyricsRequest {
    LyricsRequest {
        track_id: track_id.into(),
        artist_name: "Artist".into(),
        track_title: "Song".into(),
    }
}

fn analysis_request(track_id: &str) -> AnalysisRequest {
    AnalysisRequest {
        track_id: track_id.into(),
        lyrics: "some words".into(),
    }
}

fn analysis(base_url: String) -> AnalysisService {
    AnalysisService::new(
        Transport::new(Client::new()),
        base_url,
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn well_formed_lyrics_are_decoded() {
    let base = start().await;
    let lyrics = LyricsService::new(Transport::new(Client::new()), base, Duration::from_secs(5));

    let records = lyrics
        .get_lyrics_list(&[lyrics_request("t1"), lyrics_request("t2")])
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].track_title, "Song");
    assert_eq!(records[1].lyrics.as_deref(), Some("some words"));
}

#[tokio::test]
async fn one_malformed_lyrics_entry_fails_the_call() {
    let base = start().await;
    let lyrics = LyricsService::new(Transport::new(Client::new()), base, Duration::from_secs(5));

    let err = lyrics
        .get_lyrics_list(&[lyrics_request("t1"), lyrics_request("broken")])
        .await
        .unwrap_err();

    match err {
        LyricsError::InvalidData(msg) => assert!(msg.contains("track_title")),
        other => panic!("expected invalid data, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_profiles_are_dropped_and_valid_ones_kept() {
    let base = start().await;
    let requests = vec![
        analysis_request("good"),
        analysis_request("partial"),
        analysis_request("unknown-key"),
        analysis_request("out-of-range"),
    ];

    let batch = analysis(base).get_emotional_profiles(requests).await;

    assert_eq!(batch.profiles.len(), 1);
    assert_eq!(batch.profiles[0].track_id, "good");
    assert_eq!(batch.profiles[0].emotion_scores.get(Emotion::Joy), 0.9);

    let failed: Vec<&str> = batch.failures.iter().map(|f| f.track_id.as_str()).collect();
    assert_eq!(failed, vec!["partial", "unknown-key", "out-of-range"]);
    assert!(batch
        .failures
        .iter()
        .all(|f| matches!(f.error, AnalysisError::InvalidData(_))));
}

#[tokio::test]
async fn out_of_range_score_names_the_emotion() {
    let base = start().await;

    let err = analysis(base)
        .get_emotional_profile(&analysis_request("out-of-range"))
        .await
        .unwrap_err();

    match err {
        AnalysisError::InvalidData(msg) => assert!(msg.contains("joy")),
        other => panic!("expected invalid data, got {:?}", other),
    }
}

#[tokio::test]
async fn profile_for_another_track_is_rejected() {
    let base = start().await;

    let err = analysis(base)
        .get_emotional_profile(&analysis_request("wrong-id"))
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::InvalidData(_)));
}
