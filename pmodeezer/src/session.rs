//! Caller-owned session: cookie jar and fixed headers.
//!
//! The gateway authenticates through the browser cookies of a logged-in
//! account (the `arl` cookie). The embedding application fills the jar; the
//! client only reads it.

use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::sync::Arc;

/// Default User-Agent sent with gateway requests
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/79.0.3945.130 Safari/537.36";

/// Cookie store and headers shared by every request of a [`DeezerGw`](crate::DeezerGw)
#[derive(Debug, Clone)]
pub struct Session {
    cookies: Arc<Jar>,
    headers: HeaderMap,
}

impl Session {
    pub fn new(cookies: Arc<Jar>, headers: HeaderMap) -> Self {
        Self { cookies, headers }
    }

    pub fn cookies(&self) -> &Arc<Jar> {
        &self.cookies
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Default for Session {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        Self::new(Arc::new(Jar::default()), headers)
    }
}
