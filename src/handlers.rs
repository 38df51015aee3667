//! HTTP handlers for the insights API.
//!
//! The user's Spotify tokens travel as cookies. Every handler that talks to
//! Spotify writes the tokens it ended up with back into the response cookies,
//! since a refresh may have replaced them.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::emotion::Emotion;
use crate::error::AppError;
use crate::spotify::{ItemType, TimeRange, TokenPair, TokenRefresher};
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Query parameters for top tracks/artists.
#[derive(Debug, Deserialize)]
pub struct TopItemsQuery {
    #[serde(default)]
    pub time_range: TimeRange,
    /// Max results (10-50, default 50).
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query parameters for top emotions.
#[derive(Debug, Deserialize)]
pub struct TopEmotionsQuery {
    #[serde(default)]
    pub time_range: TimeRange,
    /// Number of emotions to return (default 5).
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub login_url: String,
    pub oauth_state: String,
}

#[derive(Debug, Deserialize)]
pub struct TokensRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn tokens_from_cookies(jar: &CookieJar) -> Result<TokenPair, AppError> {
    let access = jar.get(ACCESS_TOKEN_COOKIE).map(Cookie::value);
    let refresh = jar.get(REFRESH_TOKEN_COOKIE).map(Cookie::value);

    match (access, refresh) {
        (Some(a), Some(r)) if !a.is_empty() && !r.is_empty() => Ok(TokenPair::new(a, r)),
        _ => Err(AppError::BadRequest(
            "requests must include an access token and a refresh token".into(),
        )),
    }
}

fn token_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn with_token_cookies(jar: CookieJar, tokens: &TokenPair, secure: bool) -> CookieJar {
    jar.add(token_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.clone(), secure))
        .add(token_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone(), secure))
}

/// 16 random bytes, hex encoded.
fn generate_oauth_state() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn top_items_limit(limit: Option<u32>) -> Result<u32, AppError> {
    match limit.unwrap_or(50) {
        l @ 10..=50 => Ok(l),
        l => Err(AppError::BadRequest(format!(
            "limit must be between 10 and 50, got {}",
            l
        ))),
    }
}

/// GET /health - Health check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /spotify/login - Authorization URL plus the state the caller must verify.
pub async fn login(State(state): State<AppState>) -> Json<LoginResponse> {
    let oauth_state = generate_oauth_state();
    let login_url = state.auth.build_authorization_url(&oauth_state);
    Json(LoginResponse {
        login_url,
        oauth_state,
    })
}

/// POST /spotify/tokens - Exchange an authorization code.
pub async fn create_tokens(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<TokensRequest>, AppError>,
) -> Result<(CookieJar, Json<TokenPair>), AppError> {
    let tokens = state.auth.exchange_code(&body.code).await?;
    info!("user signed in");
    Ok((
        with_token_cookies(jar, &tokens, state.cookie_secure),
        Json(tokens),
    ))
}

/// POST /spotify/refresh-tokens - Trade a refresh token for a new pair.
pub async fn refresh_tokens(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<RefreshRequest>, AppError>,
) -> Result<(CookieJar, Json<TokenPair>), AppError> {
    let tokens = state.auth.refresh(&body.refresh_token).await?;
    Ok((
        with_token_cookies(jar, &tokens, state.cookie_secure),
        Json(tokens),
    ))
}

/// GET /me/profile
pub async fn profile(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let tokens = tokens_from_cookies(&jar)?;
    let result = state.music.get_profile(&tokens).await?;
    Ok((
        with_token_cookies(jar, &result.tokens, state.cookie_secure),
        Json(result.data),
    ))
}

async fn top_items(
    state: AppState,
    jar: CookieJar,
    item_type: ItemType,
    params: TopItemsQuery,
) -> Result<impl IntoResponse, AppError> {
    let limit = top_items_limit(params.limit)?;
    let tokens = tokens_from_cookies(&jar)?;
    let result = state
        .music
        .get_top_items(&tokens, item_type, params.time_range, limit)
        .await?;
    Ok((
        with_token_cookies(jar, &result.tokens, state.cookie_secure),
        Json(result.data),
    ))
}

/// GET /me/top/tracks
pub async fn top_tracks(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Query(params), _): WithRejection<Query<TopItemsQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    top_items(state, jar, ItemType::Tracks, params).await
}

/// GET /me/top/artists
pub async fn top_artists(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Query(params), _): WithRejection<Query<TopItemsQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    top_items(state, jar, ItemType::Artists, params).await
}

/// GET /me/top/emotions
pub async fn top_emotions(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Query(params), _): WithRejection<Query<TopEmotionsQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = tokens_from_cookies(&jar)?;
    let result = state
        .insights
        .get_top_emotions(&tokens, params.limit.unwrap_or(5), params.time_range)
        .await?;
    Ok((
        with_token_cookies(jar, &result.tokens, state.cookie_secure),
        Json(result.data),
    ))
}

async fn item_by_id(
    state: AppState,
    jar: CookieJar,
    id: String,
    item_type: ItemType,
) -> Result<impl IntoResponse, AppError> {
    let tokens = tokens_from_cookies(&jar)?;
    let result = state.music.get_item_by_id(&id, &tokens, item_type).await?;
    Ok((
        with_token_cookies(jar, &result.tokens, state.cookie_secure),
        Json(result.data),
    ))
}

/// GET /tracks/:track_id
pub async fn track_by_id(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Path(track_id), _): WithRejection<Path<String>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    item_by_id(state, jar, track_id, ItemType::Tracks).await
}

/// GET /artists/:artist_id
pub async fn artist_by_id(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Path(artist_id), _): WithRejection<Path<String>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    item_by_id(state, jar, artist_id, ItemType::Artists).await
}

/// GET /tracks/:track_id/lyrics/emotional-tags/:emotion
pub async fn lyrics_emotional_tags(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Path((track_id, emotion)), _): WithRejection<Path<(String, Emotion)>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = tokens_from_cookies(&jar)?;
    let result = state
        .insights
        .tag_lyrics_with_emotion(&track_id, emotion, &tokens)
        .await?;
    Ok((
        with_token_cookies(jar, &result.tokens, state.cookie_secure),
        Json(result.data),
    ))
}

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/spotify/login", get(login))
        .route("/spotify/tokens", post(create_tokens))
        .route("/spotify/refresh-tokens", post(refresh_tokens))
        .route("/me/profile", get(profile))
        .route("/me/top/tracks", get(top_tracks))
        .route("/me/top/artists", get(top_artists))
        .route("/me/top/emotions", get(top_emotions))
        .route("/tracks/:track_id", get(track_by_id))
        .route(
            "/tracks/:track_id/lyrics/emotional-tags/:emotion",
            get(lyrics_emotional_tags),
        )
        .route("/artists/:artist_id", get(artist_by_id))
}

/// CORS for the configured frontend origins; cookies require credentials.
pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
