//! Shared test infrastructure: mock upstream servers and payload fixtures.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use serde_json::{json, Value};
use spotify_insights::config::Config;
use spotify_insights::emotion::Emotion;
use tokio::net::TcpListener;

/// Serve `app` on a random local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener
        .local_addr()
        .expect("Failed to read listener address");

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("Mock server failed");
    });

    format!("http://{}", addr)
}

/// Config pointing every upstream at `base_url`.
pub fn test_config(base_url: &str) -> Config {
    Config {
        port: 0,
        spotify_client_id: "client".into(),
        spotify_client_secret: "secret".into(),
        spotify_auth_redirect_uri: "http://localhost:3000/callback".into(),
        spotify_auth_user_scope: "user-top-read".into(),
        spotify_auth_base_url: base_url.to_string(),
        spotify_data_base_url: base_url.to_string(),
        lyrics_base_url: base_url.to_string(),
        analysis_base_url: base_url.to_string(),
        allowed_origins: vec![],
        cookie_secure: false,
        request_timeout: Duration::from_secs(5),
        analysis_timeout: Duration::from_secs(5),
    }
}

/// A Spotify track object as returned by the Web API.
pub fn track_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Song {}", id),
        "album": {
            "images": [{"url": format!("http://img/{}.png", id), "width": 300, "height": 300}],
            "release_date": "2021-05-01"
        },
        "artists": [{"id": format!("artist-{}", id), "name": format!("Artist {}", id)}],
        "external_urls": {"spotify": format!("http://open/track/{}", id)},
        "explicit": false,
        "duration_ms": 180000,
        "popularity": 60
    })
}

/// An analysis-service profile with `scores` set and every other emotion at 0.
pub fn profile_json(track_id: &str, lyrics: &str, scores: &[(Emotion, f64)]) -> Value {
    let mut profile = serde_json::Map::new();
    for emotion in Emotion::ALL {
        let score = scores
            .iter()
            .find(|(e, _)| *e == emotion)
            .map(|(_, s)| *s)
            .unwrap_or(0.0);
        profile.insert(emotion.as_str().to_string(), json!(score));
    }

    json!({
        "track_id": track_id,
        "lyrics": lyrics,
        "emotional_profile": Value::Object(profile)
    })
}
