//! Shared fixtures for the gateway integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use pmodeezer::{DeezerGw, Pacer, Pause, RetryPolicy, Session};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const GW_PATH: &str = "/ajax/gw-light.php";

/// Records pauses instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Pause>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Pause> {
        self.pauses.lock().unwrap().clone()
    }

    /// Every pause except the per-pass jitter
    pub fn delays(&self) -> Vec<Pause> {
        self.pauses()
            .into_iter()
            .filter(|p| !matches!(p, Pause::Jitter(_)))
            .collect()
    }

    pub fn jitters(&self) -> usize {
        self.pauses()
            .iter()
            .filter(|p| matches!(p, Pause::Jitter(_)))
            .count()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, pause: Pause) {
        self.pauses.lock().unwrap().push(pause);
    }
}

/// Retry policy of the tests: default budgets, no jitter
pub fn quiet_retry() -> RetryPolicy {
    RetryPolicy {
        jitter_min_ms: 0,
        jitter_max_ms: 0,
        ..RetryPolicy::default()
    }
}

pub fn client_for(endpoint: String) -> (DeezerGw, Arc<RecordingPacer>) {
    let pacer = Arc::new(RecordingPacer::default());
    let gw = DeezerGw::builder()
        .session(Session::default())
        .endpoint(endpoint)
        .retry(quiet_retry())
        .pacer(pacer.clone())
        .build()
        .unwrap();
    (gw, pacer)
}

pub fn client(server: &MockServer) -> (DeezerGw, Arc<RecordingPacer>) {
    client_for(format!("{}{}", server.uri(), GW_PATH))
}

/// Successful envelope around `results`
pub fn ok(results: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "error": {}, "results": results }))
}

/// Failed envelope
pub fn gw_error(error: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "error": error, "results": {} }))
}

/// Failed envelope asking for replacement arguments
pub fn fallback(fallback: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "error": {"DATA_ERROR": "track not found"},
        "results": {},
        "payload": {"FALLBACK": fallback},
    }))
}

pub fn user_data(user_id: u64, token: &str) -> Value {
    json!({
        "USER": {"USER_ID": user_id, "BLOG_NAME": "tester"},
        "checkForm": token,
    })
}

/// POST to the gateway for one remote method
pub fn gw_call(remote_method: &str) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path(GW_PATH))
        .and(query_param("method", remote_method))
}

/// Bootstrap call handing out `token`
pub async fn mount_bootstrap(server: &MockServer, token: &str) {
    gw_call("deezer.getUserData")
        .and(query_param("api_token", "null"))
        .respond_with(ok(user_data(1, token)))
        .mount(server)
        .await;
}
