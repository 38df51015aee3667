//! Domain records returned by the Spotify gateways, plus the raw response
//! shapes they are decoded from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access/refresh credential bundle for the Spotify API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// A value fetched on behalf of the user together with the tokens that were
/// current when the call completed. The tokens differ from the ones passed in
/// when a refresh happened, so callers must always persist them.
#[derive(Clone, Debug)]
pub struct Refreshed<T> {
    pub data: T,
    pub tokens: TokenPair,
}

impl<T> Refreshed<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Refreshed<U> {
        Refreshed {
            data: f(self.data),
            tokens: self.tokens,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemType {
    Tracks,
    Artists,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Tracks => "tracks",
            ItemType::Artists => "artists",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window over which Spotify computes a user's top items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "short_term")]
    Short,
    #[default]
    #[serde(rename = "medium_term")]
    Medium,
    #[serde(rename = "long_term")]
    Long,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Short => "short_term",
            TimeRange::Medium => "medium_term",
            TimeRange::Long => "long_term",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackArtist {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub images: Vec<Image>,
    pub spotify_url: String,
    pub artist: TrackArtist,
    pub release_date: String,
    pub explicit: bool,
    pub duration_ms: u64,
    pub popularity: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub images: Vec<Image>,
    pub spotify_url: String,
    pub genres: Vec<String>,
}

/// A top item or an item looked up by id.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MusicItem {
    Track(Track),
    Artist(Artist),
}

impl MusicItem {
    pub fn id(&self) -> &str {
        match self {
            MusicItem::Track(t) => &t.id,
            MusicItem::Artist(a) => &a.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MusicItem::Track(t) => &t.name,
            MusicItem::Artist(a) => &a.name,
        }
    }

    pub fn as_track(&self) -> Option<&Track> {
        match self {
            MusicItem::Track(t) => Some(t),
            MusicItem::Artist(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub images: Vec<Image>,
    pub spotify_url: String,
}

// ---------------------------------------------------------------------------
// Raw Spotify payloads. Every field the domain records need is mandatory, so a
// missing key surfaces as a single serde error at decode time.

#[derive(Deserialize)]
pub(crate) struct TopItemsPage {
    pub items: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ExternalUrls {
    spotify: String,
}

#[derive(Deserialize)]
struct RawAlbum {
    images: Vec<Image>,
    release_date: String,
}

#[derive(Deserialize)]
struct RawArtistRef {
    id: String,
    name: String,
}

#[derive(Deserialize)]
pub(crate) struct RawTrack {
    id: String,
    name: String,
    album: RawAlbum,
    artists: Vec<RawArtistRef>,
    external_urls: ExternalUrls,
    explicit: bool,
    duration_ms: u64,
    popularity: u8,
}

#[derive(Deserialize)]
pub(crate) struct RawArtist {
    id: String,
    name: String,
    images: Vec<Image>,
    external_urls: ExternalUrls,
    genres: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawProfile {
    id: String,
    display_name: Option<String>,
    email: Option<String>,
    #[serde(default)]
    images: Vec<Image>,
    external_urls: ExternalUrls,
}

impl TryFrom<RawTrack> for Track {
    type Error = String;

    fn try_from(raw: RawTrack) -> Result<Self, Self::Error> {
        let artist = raw
            .artists
            .into_iter()
            .next()
            .ok_or_else(|| format!("track {} has no artists", raw.id))?;

        Ok(Track {
            id: raw.id,
            name: raw.name,
            images: raw.album.images,
            spotify_url: raw.external_urls.spotify,
            artist: TrackArtist {
                id: artist.id,
                name: artist.name,
            },
            release_date: raw.album.release_date,
            explicit: raw.explicit,
            duration_ms: raw.duration_ms,
            popularity: raw.popularity,
        })
    }
}

impl From<RawArtist> for Artist {
    fn from(raw: RawArtist) -> Self {
        Artist {
            id: raw.id,
            name: raw.name,
            images: raw.images,
            spotify_url: raw.external_urls.spotify,
            genres: raw.genres,
        }
    }
}

impl From<RawProfile> for UserProfile {
    fn from(raw: RawProfile) -> Self {
        UserProfile {
            id: raw.id,
            display_name: raw.display_name,
            email: raw.email,
            images: raw.images,
            spotify_url: raw.external_urls.spotify,
        }
    }
}

/// Decode one Spotify track or artist object into a [`MusicItem`].
pub(crate) fn decode_item(value: serde_json::Value, item_type: ItemType) -> Result<MusicItem, String> {
    match item_type {
        ItemType::Tracks => {
            let raw: RawTrack = serde_json::from_value(value)
                .map_err(|e| format!("invalid track object: {}", e))?;
            Track::try_from(raw).map(MusicItem::Track)
        }
        ItemType::Artists => {
            let raw: RawArtist = serde_json::from_value(value)
                .map_err(|e| format!("invalid artist object: {}", e))?;
            Ok(MusicItem::Artist(raw.into()))
        }
    }
}
