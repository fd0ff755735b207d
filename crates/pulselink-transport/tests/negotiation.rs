//! End-to-end negotiation tests: config + session state in, query string out.

use pretty_assertions::assert_eq;
use pulselink_transport::{
    ClientConfig, ConnectionMode, RecoveryContext, SessionState, TransportParams, base_params,
    to_query_string,
};

fn snapshot(config: ClientConfig, session: SessionState) -> TransportParams {
    TransportParams::new("realtime.example.com", 443, true, config)
        .with_session(session)
        .with_agent("pulselink-rust/0.1.0")
}

#[test]
fn clean_attempt_produces_minimal_query_string() {
    let negotiated = snapshot(ClientConfig::default(), SessionState::new())
        .connect_params(&base_params());

    assert_eq!(negotiated.mode, ConnectionMode::Clean);
    assert_eq!(
        to_query_string(&negotiated.params),
        "v=2&format=json&agent=pulselink-rust%2F0.1.0"
    );
}

#[test]
fn resume_attempt_produces_resume_query_string() {
    let negotiated = snapshot(
        ClientConfig::default().with_binary_protocol(true),
        SessionState::resuming("abc123", Some(42)),
    )
    .connect_params(&base_params());

    assert_eq!(negotiated.mode, ConnectionMode::Resume);
    assert_eq!(
        to_query_string(&negotiated.params),
        "v=2&format=msgpack&resume=abc123&connectionSerial=42&agent=pulselink-rust%2F0.1.0"
    );
}

#[test]
fn recovery_survives_a_persist_and_decode_cycle() {
    // The coordinator persists a token from one process lifetime...
    let token = RecoveryContext::new("xyz").encode().unwrap();

    // ...and a fresh client recovers from it.
    let negotiated = snapshot(
        ClientConfig::default().with_recover(token),
        SessionState::new(),
    )
    .connect_params(&base_params());

    assert_eq!(negotiated.mode, ConnectionMode::Recover);
    assert_eq!(
        to_query_string(&negotiated.params),
        "v=2&format=json&recover=xyz&agent=pulselink-rust%2F0.1.0"
    );
}

#[test]
fn full_option_surface_keeps_wire_order() {
    let config = ClientConfig::default()
        .without_echo()
        .with_client_id("user@example.com")
        .with_transport_param("remainPresentFor", "30000");
    let mut session = SessionState::new();
    session.heartbeats = false;

    let negotiated = snapshot(config, session).connect_params(&base_params());

    assert_eq!(
        to_query_string(&negotiated.params),
        "v=2&format=json&echo=false&clientId=user%40example.com&heartbeats=false\
         &remainPresentFor=30000&agent=pulselink-rust%2F0.1.0"
    );
}

#[test]
fn identical_snapshots_negotiate_identically() {
    let build = || {
        snapshot(
            ClientConfig::default().with_client_id("c1"),
            SessionState::resuming("key", None),
        )
        .connect_params(&base_params())
    };

    let first = build();
    let second = build();
    assert_eq!(first, second);
    assert_eq!(
        to_query_string(&first.params),
        to_query_string(&second.params)
    );
}
