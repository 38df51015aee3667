//! Backend-for-frontend that turns a Spotify user's top tracks into an
//! emotional profile, using a lyrics service and a lyrics emotion-analysis
//! service.

pub mod analysis;
pub mod config;
pub mod emotion;
pub mod error;
pub mod handlers;
pub mod insights;
pub mod lyrics;
pub mod spotify;
pub mod state;
pub mod transport;
