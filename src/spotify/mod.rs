//! Spotify Web API access.
//!
//! Uses the Authorization Code flow: the user's tokens travel with each call and
//! are refreshed transparently when Spotify answers 401.

mod auth;
mod data;
mod models;
mod retry;

pub use auth::{AuthError, OAuthSettings, SpotifyAuth, TokenRefresher};
pub use data::{MusicCatalog, MusicError, SpotifyData};
pub use models::{
    Artist, Image, ItemType, MusicItem, Refreshed, TimeRange, TokenPair, Track, TrackArtist,
    UserProfile,
};
