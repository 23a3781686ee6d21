//! Deliberate pauses taken by the call engine.
//!
//! Every sleep goes through a [`Pacer`] so an embedding application (or a
//! test) can observe or shorten them.

use async_trait::async_trait;
use std::time::Duration;

/// Why the engine is pausing, and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Randomized courtesy delay before each pass of a call
    Jitter(Duration),
    /// Backoff after a 403/429 answer
    RateLimit(Duration),
    /// Fixed delay before replaying a call after a connection fault
    Reconnect(Duration),
}

impl Pause {
    pub fn duration(&self) -> Duration {
        match *self {
            Self::Jitter(d) | Self::RateLimit(d) | Self::Reconnect(d) => d,
        }
    }
}

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, pause: Pause) {
        tokio::time::sleep(pause.duration()).await;
    }
}
