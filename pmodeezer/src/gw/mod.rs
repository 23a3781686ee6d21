//! Client for the Deezer gateway (`gw-light.php`)
//!
//! Every gateway operation is a POST to a single endpoint; the remote method
//! is named by the `method` query parameter and its arguments travel as the
//! JSON body. All operations funnel through [`DeezerGw::api_call`], which
//! owns the API token and absorbs rate limiting, connection faults, token
//! expiry and server-side parameter fallbacks.
//!
//! The domain operations are split by entity (`user`, `track`, `album`,
//! `artist`, `playlist`, `favorites`, `search`) as `impl DeezerGw` blocks.

mod album;
mod artist;
mod engine;
mod favorites;
mod playlist;
mod search;
mod track;
mod user;

pub use artist::DiscographyTabs;
pub use engine::BOOTSTRAP_METHOD;
pub use playlist::APPEND_OFFSET;
pub use search::SearchOptions;

use crate::config::{GwConfig, RetryPolicy};
use crate::error::Result;
use crate::pacer::{Pacer, TokioPacer};
use crate::session::Session;
use reqwest::Client;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use url::Url;

/// Default `nb` of [`DeezerGw::get_user_profile_page`]
pub const DEFAULT_PROFILE_LIMIT: u32 = 10;
/// Default `nb` of [`DeezerGw::get_user_favorite_ids`]
pub const DEFAULT_FAVORITE_IDS_LIMIT: u32 = 10_000;
/// Default size of the user collections (playlists, albums, artists, tracks)
pub const DEFAULT_COLLECTION_LIMIT: u32 = 25;
/// Default discography page size
pub const DEFAULT_DISCOGRAPHY_LIMIT: u32 = 25;
/// Default `nb` of [`DeezerGw::get_artist_top_tracks`]
pub const DEFAULT_TOP_TRACKS_LIMIT: u32 = 100;
/// Default `nb` of the search operations
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Deezer gateway client
///
/// The client is `Send + Sync`: share it behind an `Arc` to issue calls
/// concurrently. Calls only share the API token, which is read when a call
/// starts and replaced when the gateway rejects it.
///
/// # Example
///
/// ```no_run
/// use pmodeezer::{DeezerGw, Session};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let session = Session::default();
///     let url = "https://www.deezer.com".parse()?;
///     session.cookies().add_cookie_str("arl=YOUR_ARL; Domain=.deezer.com", &url);
///
///     let gw = DeezerGw::new(session)?;
///     let track = gw.get_track(3135556).await?;
///     println!("{} - {}", track.art_name, track.sng_title);
///     Ok(())
/// }
/// ```
pub struct DeezerGw {
    http: Client,
    endpoint: Url,
    config: GwConfig,
    session: Session,
    pacer: Arc<dyn Pacer>,
    token: RwLock<Option<String>>,
}

impl DeezerGw {
    /// Create a client with default settings
    pub fn new(session: Session) -> Result<Self> {
        Self::builder().session(session).build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> GwBuilder {
        GwBuilder::default()
    }

    pub fn config(&self) -> &GwConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The API token currently in use, if one was fetched
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the current token; the next call fetches a new one
    pub fn invalidate_token(&self) {
        self.replace_token(None);
    }

    pub(crate) fn replace_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Store `token` unless another call already stored one
    pub(crate) fn adopt_token_if_absent(&self, token: &str) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(token.to_string());
        }
    }
}

impl fmt::Debug for DeezerGw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeezerGw")
            .field("endpoint", &self.endpoint.as_str())
            .field("config", &self.config)
            .field("has_token", &self.token().is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a [`DeezerGw`]
pub struct GwBuilder {
    session: Option<Session>,
    config: GwConfig,
    pacer: Option<Arc<dyn Pacer>>,
}

impl Default for GwBuilder {
    fn default() -> Self {
        Self {
            session: None,
            config: GwConfig::default(),
            pacer: None,
        }
    }
}

impl GwBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie jar and headers sent with every request
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: GwConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the gateway endpoint URL
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    /// Set the timeout of one HTTP exchange
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_secs = timeout.as_secs();
        self
    }

    /// Set the retry and backoff policy
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set who performs the engine's pauses (defaults to [`TokioPacer`])
    pub fn pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<DeezerGw> {
        let endpoint = Url::parse(&self.config.endpoint)?;
        let session = self.session.unwrap_or_default();

        let http = Client::builder()
            .cookie_provider(session.cookies().clone())
            .default_headers(session.headers().clone())
            .timeout(self.config.request_timeout())
            .build()?;

        Ok(DeezerGw {
            http,
            endpoint,
            config: self.config,
            session,
            pacer: self.pacer.unwrap_or_else(|| Arc::new(TokioPacer)),
            token: RwLock::new(None),
        })
    }
}
