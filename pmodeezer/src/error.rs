//! Error types for the Deezer gateway client

use serde_json::Value;

/// Result type alias for Deezer gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the Deezer gateway client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport fault that is not worth retrying (TLS, redirect loop, body error...)
    #[error("{method} {args}:: {source}")]
    Transport {
        method: String,
        args: Value,
        #[source]
        source: reqwest::Error,
    },

    /// The gateway answered with an unexpected HTTP status
    #[error("{method} {args}:: HTTP status {status}")]
    Status {
        method: String,
        args: Value,
        status: u16,
    },

    /// The gateway returned an error mapping that no recovery path handles
    #[error("{method} {args}:: {payload}")]
    Api {
        method: String,
        args: Value,
        payload: Value,
    },

    /// Reconnects, token refreshes and fallback replays hit the recovery cap
    #[error("{method}: giving up after {recoveries} recoveries ({last})")]
    RetriesExhausted {
        method: String,
        recoveries: u32,
        last: String,
    },

    /// The response body is not a gateway envelope, or the payload has an unexpected shape
    #[error("{method}: malformed response: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// The bootstrap call did not hand out an API token
    #[error("deezer.getUserData returned no checkForm token")]
    MissingToken,

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing failed
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors raised after the transient-fault retries ran out
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }

    /// True when the gateway itself reported the error
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// The serialized gateway error mapping, if any
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Api { payload, .. } => Some(payload),
            _ => None,
        }
    }
}
