// Integration tests for `StreamSession` using wiremock.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use reqwest::Method;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lightpoke_api::transport::TransportConfig;
use lightpoke_api::{Error, ServerEndpoint, StreamSession};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StreamSession, ServerEndpoint) {
    let server = MockServer::start().await;
    let endpoint = ServerEndpoint::parse(&server.uri());
    let session = StreamSession::new(TransportConfig::default());
    (server, session, endpoint)
}

/// Poll until a line shows up or ~2s pass.
async fn next_line(session: &mut StreamSession) -> Option<String> {
    for _ in 0..200 {
        if let Some(line) = session.poll_line() {
            return Some(line);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}

const STREAM_BODY: &str = "data: {\"type\":\"heartbeat\"}\n\
                           \n\
                           data: {\"type\":\"poke\",\"sustainS\":5,\"state\":{\"on\":true}}\n";

// ── Subscribe ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscribe_streams_lines() {
    let (server, mut session, endpoint) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/device/key1/poke/stream"))
        .and(header("accept", "text/event-stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(STREAM_BODY),
        )
        .expect(1)
        .mount(&server)
        .await;

    session.open(&endpoint).unwrap();
    session.send_subscribe("key1").await.unwrap();

    assert_eq!(
        next_line(&mut session).await.as_deref(),
        Some(r#"data: {"type":"heartbeat"}"#)
    );
    assert_eq!(next_line(&mut session).await.as_deref(), Some(""));
    assert_eq!(
        next_line(&mut session).await.as_deref(),
        Some(r#"data: {"type":"poke","sustainS":5,"state":{"on":true}}"#)
    );
}

#[tokio::test]
async fn test_stream_end_closes_session() {
    let (server, mut session, endpoint) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/device/key1/poke/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string("data: {}\n"))
        .mount(&server)
        .await;

    session.open(&endpoint).unwrap();
    session.send_subscribe("key1").await.unwrap();

    assert_eq!(next_line(&mut session).await.as_deref(), Some("data: {}"));

    for _ in 0..200 {
        if !session.is_open() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!session.is_open());
    assert_eq!(session.poll_line(), None);
}

#[tokio::test]
async fn test_subscribe_rejected_status() {
    let (server, mut session, endpoint) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/device/nope/poke/stream"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    session.open(&endpoint).unwrap();
    let err = session.send_subscribe("nope").await.unwrap_err();

    assert!(matches!(err, Error::Status { status: 404, .. }));
    assert!(!session.is_open());
}

#[tokio::test]
async fn test_subscribe_times_out_when_server_never_answers() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let silent = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut session = StreamSession::new(TransportConfig {
        connect_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_millis(300),
        ..TransportConfig::default()
    });
    session
        .open(&ServerEndpoint::parse(&format!("http://127.0.0.1:{port}")))
        .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), session.send_subscribe("key1"))
        .await
        .expect("subscribe must give up on a silent server");

    assert!(matches!(result, Err(Error::Timeout { .. })), "got {result:?}");
    assert!(result.unwrap_err().is_transient());
    assert!(!session.is_open());
    silent.abort();
}

#[tokio::test]
async fn test_subscribe_requires_open() {
    let mut session = StreamSession::new(TransportConfig::default());
    let err = session.send_subscribe("key1").await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));
}

#[tokio::test]
async fn test_open_rejects_zero_port() {
    let mut session = StreamSession::new(TransportConfig::default());
    let err = session
        .open(&ServerEndpoint::parse("http://10.0.0.5:abc"))
        .unwrap_err();

    assert!(matches!(err, Error::InvalidEndpoint { .. }));
    assert!(session.endpoint().is_none());
    assert!(!session.is_open());
}

#[tokio::test]
async fn test_close_stops_line_delivery() {
    let (server, mut session, endpoint) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/device/key1/poke/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STREAM_BODY))
        .mount(&server)
        .await;

    session.open(&endpoint).unwrap();
    session.send_subscribe("key1").await.unwrap();
    session.close();

    assert!(!session.is_open());
    assert_eq!(session.poll_line(), None);
}

// ── One-shot ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_one_shot_post() {
    let (server, mut session, endpoint) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/device/key1/poke"))
        .and(header("content-length", "0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    session.open(&endpoint).unwrap();
    session
        .send_one_shot(Method::POST, "/api/device/key1/poke")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_one_shot_server_error() {
    let (server, mut session, endpoint) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/device/key1/poke"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    session.open(&endpoint).unwrap();
    let err = session
        .send_one_shot(Method::POST, "/api/device/key1/poke")
        .await
        .unwrap_err();

    assert!(err.is_transient());
}
