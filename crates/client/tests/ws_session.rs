//! WebSocket session tests against the mock echo server.

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time::timeout;

use surge_client::{WsEvent, WsOptions, WsSession};
use surge_domain::{
    CLOSE_ABNORMAL, CLOSE_NORMAL, SessionState, TIMEOUT_CLOSE_REASON, TargetSpec,
};

async fn start_echo() -> String {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { surge_mock_server::run(listener).await });
    format!("ws://127.0.0.1:{}/ws", addr.port())
}

async fn connect(url: &str) -> WsSession {
    WsSession::connect(WsOptions::new(TargetSpec::from_base_url(url)))
        .await
        .unwrap()
}

async fn next_message(events: &mut broadcast::Receiver<WsEvent>) -> String {
    loop {
        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for a message event")
            .unwrap();
        if let WsEvent::Message(text) = event {
            return text;
        }
    }
}

async fn next_close(events: &mut broadcast::Receiver<WsEvent>) -> (u16, String) {
    loop {
        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for a close event")
            .unwrap();
        if let WsEvent::Closed { code, reason } = event {
            return (code, reason);
        }
    }
}

async fn wait_for_terminal(session: &WsSession) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !session.state().is_terminal() {
        assert!(Instant::now() < deadline, "session never reached Closed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn echo_round_trip_and_clean_close() {
    let url = start_echo().await;
    let session = connect(&url).await;
    let mut events = session.events();

    assert_eq!(session.state(), SessionState::Open);
    session.send(&"ping").unwrap();

    // Messages are JSON-framed on the wire; the echo comes back as the
    // serialized text.
    let echoed = next_message(&mut events).await;
    let payload: String = serde_json::from_str(&echoed).unwrap();
    assert_eq!(payload, "ping");

    // No timer was armed; cancel must be a harmless no-op.
    session.cancel_timeout();

    session.close();
    let (code, _reason) = next_close(&mut events).await;
    assert_eq!(code, CLOSE_NORMAL);
    wait_for_terminal(&session).await;
}

#[tokio::test]
async fn session_id_is_generated_and_tagged() {
    let url = start_echo().await;
    let session = connect(&url).await;

    assert!(!session.session_id().is_empty());
    let tags = session.tags().to_map();
    assert_eq!(
        tags.get("sessionId").map(String::as_str),
        Some(session.session_id())
    );
    session.close();
}

#[tokio::test]
async fn idle_timeout_closes_with_1006() {
    let url = start_echo().await;
    let session = connect(&url).await;
    let mut events = session.events();

    let armed_at = Instant::now();
    session.start_timeout(Duration::from_millis(300)).unwrap();

    let (code, reason) = next_close(&mut events).await;
    let elapsed = armed_at.elapsed();

    assert_eq!(code, CLOSE_ABNORMAL);
    assert_eq!(reason, TIMEOUT_CLOSE_REASON);
    assert!(elapsed >= Duration::from_millis(300), "fired early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "fired late: {elapsed:?}");
    wait_for_terminal(&session).await;

    // The driver is gone; arming another timer reports the closed session.
    assert!(session.start_timeout(Duration::from_millis(10)).is_err());
}

#[tokio::test]
async fn rearming_replaces_the_pending_timer() {
    let url = start_echo().await;
    let session = connect(&url).await;
    let mut events = session.events();

    // A long timer followed by a short one: only the short one may fire.
    session.start_timeout(Duration::from_secs(30)).unwrap();
    session.start_timeout(Duration::from_millis(200)).unwrap();

    let armed_at = Instant::now();
    let (code, _reason) = next_close(&mut events).await;
    assert_eq!(code, CLOSE_ABNORMAL);
    assert!(armed_at.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn cancel_timeout_keeps_the_session_alive() {
    let url = start_echo().await;
    let session = connect(&url).await;
    let mut events = session.events();

    session.start_timeout(Duration::from_millis(200)).unwrap();
    session.cancel_timeout();
    session.cancel_timeout(); // idempotent

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(session.state(), SessionState::Open);

    // Still functional after the cancelled timer's deadline has passed.
    session.send(&"still-here").unwrap();
    let echoed = next_message(&mut events).await;
    assert_eq!(echoed, "\"still-here\"");
    session.close();
}

#[tokio::test]
async fn signalr_handshake_is_sent_on_open() {
    let url = start_echo().await;
    let session = WsSession::connect(
        WsOptions::new(TargetSpec::from_base_url(&url)).with_signalr(),
    )
    .await
    .unwrap();
    let mut events = session.events();

    // The echo server reflects the negotiation frame verbatim.
    let echoed = next_message(&mut events).await;
    assert_eq!(echoed, "{\"protocol\":\"json\",\"version\":1}\u{1e}");
    session.close();
}

#[tokio::test]
async fn malformed_hub_frames_do_not_kill_the_session() {
    let url = start_echo().await;
    let session = WsSession::connect(
        WsOptions::new(TargetSpec::from_base_url(&url)).with_signalr(),
    )
    .await
    .unwrap();
    let mut events = session.events();
    let _handshake = next_message(&mut events).await;

    session.send_text("not json\u{1e}").unwrap();
    let echoed = next_message(&mut events).await;
    assert_eq!(echoed, "not json\u{1e}");

    // The parse failure was logged, not fatal.
    assert_eq!(session.state(), SessionState::Open);
    session.send(&"alive").unwrap();
    assert_eq!(next_message(&mut events).await, "\"alive\"");
    session.close();
}

#[tokio::test]
async fn hub_frames_dispatch_to_target_handlers() {
    let url = start_echo().await;
    let session = WsSession::connect(
        WsOptions::new(TargetSpec::from_base_url(&url)).with_signalr(),
    )
    .await
    .unwrap();
    let mut events = session.events();
    let _handshake = next_message(&mut events).await;

    let (tx, rx) = std::sync::mpsc::channel();
    session
        .on_target("notify", move |frame| {
            let _ = tx.send(frame.body["value"].clone());
        })
        .unwrap();

    // The echo server bounces the hub frame back at us; the handler runs
    // before the message event is broadcast.
    session
        .send_text("{\"target\":\"notify\",\"value\":9}\u{1e}")
        .unwrap();
    let _echoed = next_message(&mut events).await;

    let value = rx.try_recv().unwrap();
    assert_eq!(value, serde_json::json!(9));
    session.close();
}
