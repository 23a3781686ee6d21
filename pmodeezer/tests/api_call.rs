//! Integration tests for the call engine

mod common;

use common::{client, client_for, fallback, gw_call, gw_error, mount_bootstrap, ok, user_data};
use pmodeezer::{Error, Pause};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, query_param};
use wiremock::{MockServer, ResponseTemplate};

#[tokio::test]
async fn test_first_call_bootstraps_token_once() {
    let mock_server = MockServer::start().await;

    gw_call("deezer.getUserData")
        .and(query_param("api_token", "null"))
        .respond_with(ok(user_data(1, "tok1")))
        .expect(1)
        .mount(&mock_server)
        .await;
    gw_call("song.getData")
        .and(query_param("api_token", "tok1"))
        .and(query_param("api_version", "1.0"))
        .and(query_param("input", "3"))
        .and(body_partial_json(json!({"SNG_ID": 3135556})))
        .respond_with(ok(json!({"SNG_ID": "3135556", "SNG_TITLE": "One More Time"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let (gw, pacer) = client(&mock_server);
    assert!(gw.token().is_none());

    let track = gw.get_track(3135556).await.unwrap();
    assert_eq!(track.sng_title, "One More Time");
    assert_eq!(gw.token().as_deref(), Some("tok1"));

    gw.get_track(3135556).await.unwrap();

    // One jitter per pass: bootstrap + two calls
    assert_eq!(pacer.jitters(), 3);
    assert!(pacer.delays().is_empty());
}

#[tokio::test]
async fn test_get_user_data_adopts_token() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok1").await;

    let (gw, _) = client(&mock_server);
    let data = gw.get_user_data().await.unwrap();

    assert_eq!(data.user.user_id, 1);
    assert_eq!(data.check_form.as_deref(), Some("tok1"));
    assert_eq!(gw.token().as_deref(), Some("tok1"));
}

#[tokio::test]
async fn test_csrf_error_refreshes_token_once_and_replays() {
    let mock_server = MockServer::start().await;

    gw_call("deezer.getUserData")
        .respond_with(ok(user_data(1, "tok1")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    gw_call("deezer.getUserData")
        .respond_with(ok(user_data(1, "tok2")))
        .expect(1)
        .mount(&mock_server)
        .await;
    gw_call("deezer.pageTrack")
        .and(query_param("api_token", "tok1"))
        .respond_with(gw_error(json!({"VALID_TOKEN_REQUIRED": "Invalid CSRF token"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    gw_call("deezer.pageTrack")
        .and(query_param("api_token", "tok2"))
        .respond_with(ok(json!({"DATA": {"SNG_ID": "42", "SNG_TITLE": "Track"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gw, pacer) = client(&mock_server);
    let page = gw.get_track_page(42).await.unwrap();

    assert_eq!(page.data.sng_id, 42);
    assert_eq!(gw.token().as_deref(), Some("tok2"));
    assert!(pacer.delays().is_empty());
}

#[tokio::test]
async fn test_invalid_api_token_is_a_token_error_too() {
    let mock_server = MockServer::start().await;

    gw_call("deezer.getUserData")
        .respond_with(ok(user_data(1, "tok1")))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    gw_call("deezer.getUserData")
        .respond_with(ok(user_data(1, "tok2")))
        .mount(&mock_server)
        .await;
    gw_call("song.getLyrics")
        .and(query_param("api_token", "tok1"))
        .respond_with(gw_error(json!({"GATEWAY_ERROR": "invalid api token"})))
        .mount(&mock_server)
        .await;
    gw_call("song.getLyrics")
        .and(query_param("api_token", "tok2"))
        .respond_with(ok(json!({"LYRICS_TEXT": "la la"})))
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    let lyrics = gw.get_track_lyrics(42).await.unwrap();
    assert_eq!(lyrics["LYRICS_TEXT"], "la la");
}

#[tokio::test]
async fn test_invalidated_token_is_fetched_again() {
    let mock_server = MockServer::start().await;

    gw_call("deezer.getUserData")
        .respond_with(ok(user_data(1, "tok1")))
        .expect(2)
        .mount(&mock_server)
        .await;
    gw_call("album.getData")
        .respond_with(ok(json!({"ALB_ID": "302127", "ALB_TITLE": "Discovery"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    gw.get_album(302127).await.unwrap();
    gw.invalidate_token();
    let album = gw.get_album(302127).await.unwrap();
    assert_eq!(album.alb_title, "Discovery");
}

#[tokio::test]
async fn test_fallback_merges_into_args_and_replays() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .and(body_partial_json(json!({"SNG_ID": 1})))
        .respond_with(fallback(json!({"SNG_ID": 2})))
        .expect(1)
        .mount(&mock_server)
        .await;
    gw_call("song.getData")
        .and(body_partial_json(json!({"SNG_ID": 2, "lang": "fr"})))
        .respond_with(ok(json!({"SNG_ID": "2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    let results = gw
        .api_call("song.getData", json!({"SNG_ID": 1, "lang": "fr"}), &[])
        .await
        .unwrap();
    assert_eq!(results["SNG_ID"], "2");
}

#[tokio::test]
async fn test_repeated_fallback_hits_recovery_cap() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .respond_with(fallback(json!({"SNG_ID": 2})))
        .expect(5)
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    let err = gw.get_track(1).await.unwrap_err();

    match err {
        Error::RetriesExhausted {
            method, recoveries, ..
        } => {
            assert_eq!(method, "song.getData");
            assert_eq!(recoveries, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_rate_limit_backs_off_exponentially() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .expect(3)
        .mount(&mock_server)
        .await;
    gw_call("song.getData")
        .respond_with(ok(json!({"SNG_ID": "5"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gw, pacer) = client(&mock_server);
    let track = gw.get_track(5).await.unwrap();

    assert_eq!(track.sng_id, 5);
    assert_eq!(
        pacer.delays(),
        vec![
            Pause::RateLimit(Duration::from_millis(5000)),
            Pause::RateLimit(Duration::from_millis(10000)),
            Pause::RateLimit(Duration::from_millis(20000)),
        ]
    );
    // Backoff stays inside one pass
    assert_eq!(pacer.jitters(), 2);
}

#[tokio::test]
async fn test_forbidden_counts_as_rate_limit() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    gw_call("song.getData")
        .respond_with(ok(json!({"SNG_ID": "5"})))
        .mount(&mock_server)
        .await;

    let (gw, pacer) = client(&mock_server);
    gw.get_track(5).await.unwrap();
    assert_eq!(
        pacer.delays(),
        vec![Pause::RateLimit(Duration::from_millis(5000))]
    );
}

#[tokio::test]
async fn test_exhausted_rate_limit_still_reads_envelope() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({"error": {}, "results": {"SNG_ID": "5"}})),
        )
        .expect(4)
        .mount(&mock_server)
        .await;

    let (gw, pacer) = client(&mock_server);
    let track = gw.get_track(5).await.unwrap();

    assert_eq!(track.sng_id, 5);
    assert_eq!(pacer.delays().len(), 3);
}

#[tokio::test]
async fn test_exhausted_rate_limit_without_envelope_is_status_error() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(4)
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    let err = gw.get_track(5).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 429, .. }));
}

#[tokio::test]
async fn test_server_error_fails_fast() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gw, pacer) = client(&mock_server);
    let err = gw.get_track(5).await.unwrap_err();

    assert!(matches!(err, Error::Status { status: 500, .. }));
    assert!(pacer.delays().is_empty());
}

#[tokio::test]
async fn test_unclassified_error_is_api_error() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .respond_with(gw_error(json!({"DATA_ERROR": "track not found"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    let err = gw.get_track(5).await.unwrap_err();

    assert!(err.is_api());
    assert_eq!(err.payload(), Some(&json!({"DATA_ERROR": "track not found"})));
    assert!(err.to_string().starts_with("song.getData "));
}

#[tokio::test]
async fn test_empty_array_error_means_success() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("deezer.getChildAccounts")
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": [], "results": [1, 2]})),
        )
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    assert_eq!(gw.get_child_accounts().await.unwrap(), json!([1, 2]));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    let err = gw.get_track(5).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_bootstrap_without_check_form_fails_token_fetch() {
    let mock_server = MockServer::start().await;

    gw_call("deezer.getUserData")
        .respond_with(ok(json!({"USER": {"USER_ID": 0}})))
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    let err = gw.get_track(5).await.unwrap_err();
    assert!(matches!(err, Error::MissingToken));
}

#[tokio::test]
async fn test_extra_params_override_fixed_ones() {
    let mock_server = MockServer::start().await;
    mount_bootstrap(&mock_server, "tok").await;

    gw_call("song.getData")
        .and(query_param("input", "4"))
        .and(query_param("custom", "yes"))
        .respond_with(ok(json!({"SNG_ID": "5"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gw, _) = client(&mock_server);
    gw.api_call(
        "song.getData",
        json!({"SNG_ID": 5}),
        &[("input", "4"), ("custom", "yes")],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_connection_refused_reconnects_until_cap() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (gw, pacer) = client_for(format!("http://127.0.0.1:{port}/ajax/gw-light.php"));

    let err = gw.get_user_data().await.unwrap_err();

    match err {
        Error::RetriesExhausted {
            method, recoveries, ..
        } => {
            assert_eq!(method, "deezer.getUserData");
            assert_eq!(recoveries, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        pacer.delays(),
        vec![Pause::Reconnect(Duration::from_millis(2000)); 4]
    );
    assert_eq!(pacer.jitters(), 5);
}
