//! Deezer gateway client for PMOMusic
//!
//! This crate talks to `gw-light.php`, the private JSON-RPC style gateway
//! behind the Deezer web player. It is authenticated by the caller's cookie
//! jar (an `arl` cookie) and handles the gateway's API token by itself.
//!
//! # Features
//!
//! - **Call engine**: one entry point, [`DeezerGw::api_call`], with lazy token
//!   bootstrap, token refresh, rate-limit backoff, reconnection and
//!   server-side parameter fallbacks
//! - **Catalog**: tracks, albums, artists, playlists, lyrics, editorial pages
//!   and search
//! - **Collection**: favorites, playlists edition, profile tabs
//! - **Aggregations**: batch track lookup, full discography crawl bucketed by
//!   role and record type, favorite tracks with their metadata
//!
//! # Example
//!
//! ```no_run
//! use pmodeezer::{DEFAULT_DISCOGRAPHY_LIMIT, DeezerGw, RecordType, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::default();
//!     let url = "https://www.deezer.com".parse()?;
//!     session.cookies().add_cookie_str("arl=YOUR_ARL; Domain=.deezer.com", &url);
//!
//!     let gw = DeezerGw::new(session)?;
//!
//!     // Discography of Daft Punk, official albums only
//!     let tabs = gw.get_artist_discography_tabs(27, DEFAULT_DISCOGRAPHY_LIMIT).await?;
//!     for album in tabs.of_type(RecordType::Album) {
//!         println!("{} ({})", album.title, album.release_date.as_deref().unwrap_or("?"));
//!     }
//!
//!     // Batch lookup, unknown ids come back as empty tracks
//!     let tracks = gw.get_tracks(&[3135556, 0]).await?;
//!     assert_eq!(tracks.len(), 2);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! [`GwConfig`] can be loaded from a YAML file; every field is optional:
//!
//! ```yaml
//! endpoint: https://www.deezer.com/ajax/gw-light.php
//! lang: fr
//! request_timeout_secs: 30
//! retry:
//!   max_attempts: 4
//!   initial_backoff_ms: 5000
//!   max_recoveries: 4
//! ```
//!
//! # Rate Limiting
//!
//! The gateway answers 403 or 429 when it is called too fast. The engine
//! sleeps 100 to 150 ms before each request and backs off exponentially
//! (5 s, 10 s, 20 s) on throttled answers.

pub mod config;
pub mod error;
pub mod gw;
pub mod mapping;
pub mod models;
pub mod pacer;
pub mod session;

pub use config::{GwConfig, RetryPolicy};
pub use error::{Error, Result};
pub use gw::{
    APPEND_OFFSET, BOOTSTRAP_METHOD, DEFAULT_COLLECTION_LIMIT, DEFAULT_DISCOGRAPHY_LIMIT,
    DEFAULT_FAVORITE_IDS_LIMIT, DEFAULT_PROFILE_LIMIT, DEFAULT_SEARCH_LIMIT,
    DEFAULT_TOP_TRACKS_LIMIT, DeezerGw, DiscographyTabs, GwBuilder, SearchOptions,
};
pub use mapping::{
    ArtistAlbum, Artwork, RecordType, UserAlbum, UserArtist, UserPlaylist, UserTrack,
};
pub use models::{
    FavoriteEntry, FavoriteIds, GwAlbum, GwArtist, GwPlaylist, GwTrack, ListData,
    PlaylistStatus, SearchKind, SearchResults, TrackPage, UserData,
};
pub use pacer::{Pacer, Pause, TokioPacer};
pub use session::Session;
