//! The call engine: one logical gateway call, with its recoveries.
//!
//! A logical call is a sequence of passes. A pass waits a short random
//! jitter, then POSTs the request, backing off on 403/429 answers up to
//! `max_attempts` HTTP attempts. The envelope it gets back is classified:
//!
//! | Envelope / fault                          | Next step                         |
//! |-------------------------------------------|-----------------------------------|
//! | empty `error`                             | return `results`                  |
//! | `invalid api token` / `Invalid CSRF token` | fetch a new token, new pass       |
//! | `payload.FALLBACK` present                | merge it into the args, new pass  |
//! | connection refused/reset/aborted/timeout  | sleep `reconnect_delay`, new pass |
//! | anything else                             | [`Error::Api`] / [`Error::Transport`] |
//!
//! New passes are recoveries. All three kinds draw from one budget
//! (`max_recoveries`) per logical call; once it is spent the call fails with
//! [`Error::RetriesExhausted`].

use super::DeezerGw;
use crate::error::{Error, Result};
use crate::models::UserData;
use crate::pacer::Pause;
use rand::Rng;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::error::Error as _;
use std::io::ErrorKind;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Method that hands out the API token; always called with the token `"null"`
pub const BOOTSTRAP_METHOD: &str = "deezer.getUserData";

const NULL_TOKEN: &str = "null";

/// Error mappings that mean "fetch a new token and try again"
const TOKEN_ERRORS: &[(&str, &str)] = &[
    ("GATEWAY_ERROR", "invalid api token"),
    ("VALID_TOKEN_REQUIRED", "Invalid CSRF token"),
];

/// Response envelope shared by every gateway method
#[derive(Debug, Deserialize)]
struct Envelope {
    error: Value,
    #[serde(default)]
    results: Value,
    #[serde(default)]
    payload: Option<Value>,
}

/// What a pass asks the engine to do next
#[derive(Debug)]
enum Outcome {
    Done(Value),
    Reconnect(String),
    RefreshToken(Value),
    Fallback(Map<String, Value>),
}

impl Outcome {
    fn describe(&self) -> String {
        match self {
            Self::Done(_) => "success".to_string(),
            Self::Reconnect(fault) => fault.clone(),
            Self::RefreshToken(error) => format!("token rejected: {error}"),
            Self::Fallback(fallback) => {
                format!("fallback requested: {}", Value::Object(fallback.clone()))
            }
        }
    }
}

fn is_empty_error(error: &Value) -> bool {
    match error {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_token_error(error: &Value) -> bool {
    let Some(map) = error.as_object() else {
        return false;
    };
    map.len() == 1
        && TOKEN_ERRORS
            .iter()
            .any(|(key, message)| map.get(*key).and_then(Value::as_str) == Some(*message))
}

/// Connection-level faults worth replaying the whole call for
fn is_connection_fault(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::TimedOut
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

fn merge_fallback(method: &str, args: &mut Value, fallback: Map<String, Value>) -> Result<()> {
    if args.is_null() {
        *args = Value::Object(Map::new());
    }
    match args {
        Value::Object(map) => {
            map.extend(fallback);
            Ok(())
        }
        _ => Err(Error::Api {
            method: method.to_string(),
            args: args.clone(),
            payload: json!({ "FALLBACK": fallback }),
        }),
    }
}

impl DeezerGw {
    /// Execute one logical gateway call and return its unwrapped `results`.
    ///
    /// `params` are extra query parameters; they override the fixed ones
    /// (`api_version`, `api_token`, `input`, `method`) when keys collide.
    ///
    /// A fresh client first issues [`BOOTSTRAP_METHOD`] to obtain its token.
    pub async fn api_call(
        &self,
        method: &str,
        args: Value,
        params: &[(&str, &str)],
    ) -> Result<Value> {
        if method == BOOTSTRAP_METHOD {
            return self.bootstrap_call(args, params).await;
        }

        let mut args = args;
        let mut recoveries = 0;
        loop {
            let token = match self.token() {
                Some(token) => token,
                None => self.refresh_token().await?,
            };

            let recovery = match self.pass(method, &args, params, &token).await? {
                Outcome::Done(results) => return Ok(results),
                recovery => recovery,
            };
            self.spend_recovery(method, &mut recoveries, &recovery)?;

            match recovery {
                Outcome::RefreshToken(error) => {
                    info!("{} rejected the API token ({}), fetching a new one", method, error);
                    self.refresh_token().await?;
                }
                other => self.recover(method, &mut args, other).await?,
            }
        }
    }

    /// [`api_call`](Self::api_call) followed by decoding into a record type
    pub(crate) async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Value,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let results = self.api_call(method, args, params).await?;
        serde_json::from_value(results).map_err(|source| Error::Decode {
            method: method.to_string(),
            source,
        })
    }

    /// Fetch a new API token and make it the current one
    pub async fn refresh_token(&self) -> Result<String> {
        let results = self.bootstrap_loop(json!({}), &[]).await?;
        let token = Self::check_form(&results)?;
        self.replace_token(Some(token.clone()));
        debug!("Adopted a new API token");
        Ok(token)
    }

    async fn bootstrap_call(&self, args: Value, params: &[(&str, &str)]) -> Result<Value> {
        let results = self.bootstrap_loop(args, params).await?;
        if let Ok(token) = Self::check_form(&results) {
            self.adopt_token_if_absent(&token);
        }
        Ok(results)
    }

    /// Pass loop for the bootstrap method, which never needs a token
    async fn bootstrap_loop(&self, args: Value, params: &[(&str, &str)]) -> Result<Value> {
        let mut args = args;
        let mut recoveries = 0;
        loop {
            let outcome = self
                .pass(BOOTSTRAP_METHOD, &args, params, NULL_TOKEN)
                .await?;
            let recovery = match outcome {
                Outcome::Done(results) => return Ok(results),
                recovery => recovery,
            };
            self.spend_recovery(BOOTSTRAP_METHOD, &mut recoveries, &recovery)?;
            self.recover(BOOTSTRAP_METHOD, &mut args, recovery).await?;
        }
    }

    fn check_form(results: &Value) -> Result<String> {
        let data = UserData::deserialize(results).map_err(|source| Error::Decode {
            method: BOOTSTRAP_METHOD.to_string(),
            source,
        })?;
        data.check_form
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingToken)
    }

    fn spend_recovery(
        &self,
        method: &str,
        recoveries: &mut u32,
        recovery: &Outcome,
    ) -> Result<()> {
        if *recoveries >= self.config.retry.max_recoveries {
            warn!("{} still failing after {} recoveries, giving up", method, recoveries);
            return Err(Error::RetriesExhausted {
                method: method.to_string(),
                recoveries: *recoveries,
                last: recovery.describe(),
            });
        }
        *recoveries += 1;
        Ok(())
    }

    /// Recoveries that do not touch the token
    async fn recover(&self, method: &str, args: &mut Value, recovery: Outcome) -> Result<()> {
        match recovery {
            Outcome::Reconnect(fault) => {
                let delay = self.config.retry.reconnect_delay();
                debug!("{}: {}, retrying in {}ms", method, fault, delay.as_millis());
                self.pacer.pause(Pause::Reconnect(delay)).await;
            }
            Outcome::Fallback(fallback) => {
                debug!("{}: gateway asked for fallback arguments {:?}", method, fallback);
                merge_fallback(method, args, fallback)?;
            }
            // The bootstrap sends the literal "null" token; a rejection just means retrying.
            Outcome::RefreshToken(error) => {
                debug!("{}: token error {} on a tokenless call", method, error);
            }
            Outcome::Done(_) => {}
        }
        Ok(())
    }

    /// One pass: jitter, then the HTTP exchange with rate-limit backoff, then classification
    async fn pass(
        &self,
        method: &str,
        args: &Value,
        params: &[(&str, &str)],
        token: &str,
    ) -> Result<Outcome> {
        let url = self.request_url(method, token, params);
        let retry = &self.config.retry;

        self.pacer.pause(Pause::Jitter(self.jitter())).await;

        let mut delay = retry.initial_backoff();
        let mut attempt = 0;
        let response = loop {
            debug!("POST {} (attempt {})", method, attempt + 1);
            let response = match self
                .http
                .post(url.clone())
                .timeout(self.config.request_timeout())
                .json(args)
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) if is_connection_fault(&err) => {
                    debug!("[ERROR] deezer.gw {} {}: {}", method, args, err);
                    return Ok(Outcome::Reconnect(err.to_string()));
                }
                Err(source) => {
                    debug!("[ERROR] deezer.gw {} {}: {}", method, args, source);
                    return Err(self.transport_error(method, args, source));
                }
            };

            let throttled = matches!(
                response.status(),
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            );
            if throttled && attempt + 1 < retry.max_attempts {
                warn!(
                    "Rate limit detected on {}, slowing down for {}ms. Attempt {} of {}",
                    method,
                    delay.as_millis(),
                    attempt + 1,
                    retry.max_attempts
                );
                self.pacer.pause(Pause::RateLimit(delay)).await;
                attempt += 1;
                delay *= 2;
                continue;
            }
            break response;
        };

        let status = response.status();
        let throttled = matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS);
        if !status.is_success() && !throttled {
            return Err(Error::Status {
                method: method.to_string(),
                args: args.clone(),
                status: status.as_u16(),
            });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) if is_connection_fault(&err) => {
                return Ok(Outcome::Reconnect(err.to_string()));
            }
            Err(source) => return Err(self.transport_error(method, args, source)),
        };

        // Out of attempts while throttled: use the body if it is an envelope at all.
        let envelope: Envelope = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if throttled => {
                return Err(Error::Status {
                    method: method.to_string(),
                    args: args.clone(),
                    status: status.as_u16(),
                });
            }
            Err(source) => {
                return Err(Error::Decode {
                    method: method.to_string(),
                    source,
                });
            }
        };

        self.classify(method, args, envelope)
    }

    fn classify(&self, method: &str, args: &Value, envelope: Envelope) -> Result<Outcome> {
        if is_empty_error(&envelope.error) {
            return Ok(Outcome::Done(envelope.results));
        }
        if is_token_error(&envelope.error) {
            return Ok(Outcome::RefreshToken(envelope.error));
        }
        if let Some(fallback) = envelope
            .payload
            .as_ref()
            .and_then(|payload| payload.get("FALLBACK"))
            .and_then(Value::as_object)
        {
            return Ok(Outcome::Fallback(fallback.clone()));
        }
        debug!("{} failed: {}", method, envelope.error);
        Err(Error::Api {
            method: method.to_string(),
            args: args.clone(),
            payload: envelope.error,
        })
    }

    fn transport_error(&self, method: &str, args: &Value, source: reqwest::Error) -> Error {
        Error::Transport {
            method: method.to_string(),
            args: args.clone(),
            source,
        }
    }

    fn request_url(&self, method: &str, token: &str, params: &[(&str, &str)]) -> Url {
        let mut query: Vec<(&str, &str)> = vec![
            ("api_version", self.config.api_version.as_str()),
            ("api_token", token),
            ("input", self.config.input.as_str()),
            ("method", method),
        ];
        for &(key, value) in params {
            match query.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => query.push((key, value)),
            }
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(query);
        url
    }

    fn jitter(&self) -> Duration {
        let retry = &self.config.retry;
        let millis = if retry.jitter_min_ms < retry.jitter_max_ms {
            rand::rng().random_range(retry.jitter_min_ms..retry.jitter_max_ms)
        } else {
            retry.jitter_min_ms
        };
        Duration::from_millis(millis)
    }
}
