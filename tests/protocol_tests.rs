#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Protocol serialization tests for the Scorewall client.
//!
//! Verifies the wire shape of every `ClientMessage` and `ServerMessage`
//! variant against JSON fixtures that match real dashboard server output,
//! plus the score remark bands and registration record field handling.

use scorewall_client::protocol::{AttemptRecord, ClientMessage, RegistrationRecord, ServerMessage};

// ════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════

/// Serialize `val` to JSON, then deserialize back to `T` and return it.
fn round_trip<T: serde::Serialize + serde::de::DeserializeOwned>(val: &T) -> T {
    let json = serde_json::to_string(val).expect("serialize");
    serde_json::from_str(&json).expect("deserialize")
}

fn attempt(nick: &str, score: i64) -> AttemptRecord {
    AttemptRecord {
        nick_name: nick.into(),
        score,
        email: None,
    }
}

fn attempt_with_email(nick: &str, score: i64, email: &str) -> AttemptRecord {
    AttemptRecord {
        nick_name: nick.into(),
        score,
        email: Some(email.into()),
    }
}

// ════════════════════════════════════════════════════════════════════
// ClientMessage wire format
// ════════════════════════════════════════════════════════════════════

#[test]
fn client_message_user_round_trip() {
    let msg = ClientMessage::User {
        user: RegistrationRecord::named("ada").with_email("ada@example.com"),
    };
    let deser = round_trip(&msg);
    let ClientMessage::User { user } = deser;
    assert_eq!(user.nick_name.as_deref(), Some("ada"));
    assert_eq!(user.email.as_deref(), Some("ada@example.com"));
}

#[test]
fn client_message_user_wire_shape() {
    let msg = ClientMessage::User {
        user: RegistrationRecord::named("ada").with_email("ada@example.com"),
    };
    let json = serde_json::to_string(&msg).expect("serialize");
    let val: serde_json::Value = serde_json::from_str(&json).expect("parse");

    // The tag sits beside the payload, not around it.
    assert_eq!(val["type"], "user");
    assert_eq!(val["user"]["nickName"], "ada");
    assert_eq!(val["user"]["email"], "ada@example.com");
    let obj = val.as_object().expect("object");
    assert_eq!(obj.len(), 2, "expected only 'type' and 'user' keys");
}

#[test]
fn client_message_user_matches_server_expectation() {
    // The registration frame exactly as the dashboard server parses it.
    let json = r#"{
        "type": "user",
        "user": {
            "nickName": "grace",
            "email": "grace@example.com"
        }
    }"#;
    let msg: ClientMessage = serde_json::from_str(json).expect("deserialize");
    let ClientMessage::User { user } = msg;
    assert_eq!(user.nick_name.as_deref(), Some("grace"));
    assert_eq!(user.email.as_deref(), Some("grace@example.com"));
    assert!(user.desc.is_none());
    assert!(user.extra.is_empty());
}

// ════════════════════════════════════════════════════════════════════
// ServerMessage round trips
// ════════════════════════════════════════════════════════════════════

#[test]
fn server_message_current_result_round_trip() {
    let msg = ServerMessage::CurrentResult {
        current_result: attempt_with_email("ada", 1337, "ada@example.com"),
    };
    let deser = round_trip(&msg);
    if let ServerMessage::CurrentResult { current_result } = deser {
        assert_eq!(current_result.nick_name, "ada");
        assert_eq!(current_result.score, 1337);
        assert_eq!(current_result.email.as_deref(), Some("ada@example.com"));
    } else {
        panic!("expected CurrentResult variant");
    }
}

#[test]
fn server_message_leader_board_round_trip_preserves_order() {
    let msg = ServerMessage::LeaderBoard {
        leader_board: vec![
            attempt("ada", 900),
            attempt("grace", 700),
            attempt("ada", 1200),
        ],
    };
    let deser = round_trip(&msg);
    if let ServerMessage::LeaderBoard { leader_board } = deser {
        let names: Vec<&str> = leader_board.iter().map(|a| a.nick_name.as_str()).collect();
        assert_eq!(names, vec!["ada", "grace", "ada"]);
        assert_eq!(leader_board[2].score, 1200);
    } else {
        panic!("expected LeaderBoard variant");
    }
}

// ════════════════════════════════════════════════════════════════════
// Server JSON fixture tests (simulate real server JSON)
// ════════════════════════════════════════════════════════════════════

#[test]
fn fixture_phase_announcements_from_server() {
    let cases = [
        (r#"{"type":"waitingStartSignal"}"#, "waitingStartSignal"),
        (r#"{"type":"openUserRegistration"}"#, "openUserRegistration"),
        (r#"{"type":"gameInProgress"}"#, "gameInProgress"),
    ];
    for (json, tag) in &cases {
        let msg: ServerMessage = serde_json::from_str(json)
            .unwrap_or_else(|e| panic!("deserialize {tag}: {e}"));
        let expected = match *tag {
            "waitingStartSignal" => ServerMessage::WaitingStartSignal,
            "openUserRegistration" => ServerMessage::OpenUserRegistration,
            "gameInProgress" => ServerMessage::GameInProgress,
            other => panic!("unexpected tag {other}"),
        };
        assert_eq!(msg, expected);
    }
}

#[test]
fn fixture_current_result_from_server() {
    let json = r#"{
        "type": "currentResult",
        "currentResult": {
            "nickName": "ada",
            "score": 742,
            "email": "ada@example.com"
        }
    }"#;
    let msg: ServerMessage = serde_json::from_str(json).expect("deserialize");
    if let ServerMessage::CurrentResult { current_result } = msg {
        assert_eq!(current_result.nick_name, "ada");
        assert_eq!(current_result.score, 742);
        assert_eq!(current_result.email.as_deref(), Some("ada@example.com"));
    } else {
        panic!("expected CurrentResult");
    }
}

#[test]
fn fixture_current_result_without_email() {
    let json = r#"{"type":"currentResult","currentResult":{"nickName":"bob","score":350}}"#;
    let msg: ServerMessage = serde_json::from_str(json).expect("deserialize");
    if let ServerMessage::CurrentResult { current_result } = msg {
        assert_eq!(current_result.nick_name, "bob");
        assert!(current_result.email.is_none());
    } else {
        panic!("expected CurrentResult");
    }
}

#[test]
fn fixture_leader_board_from_server() {
    let json = r#"{
        "type": "leaderBoard",
        "leaderBoard": [
            {"nickName": "ada", "score": 900, "email": "ada@example.com"},
            {"nickName": "grace", "score": 700},
            {"nickName": "ada", "score": 1200}
        ]
    }"#;
    let msg: ServerMessage = serde_json::from_str(json).expect("deserialize");
    if let ServerMessage::LeaderBoard { leader_board } = msg {
        assert_eq!(leader_board.len(), 3);
        assert_eq!(leader_board[0].email.as_deref(), Some("ada@example.com"));
        assert!(leader_board[1].email.is_none());
        assert_eq!(leader_board[2].score, 1200);
    } else {
        panic!("expected LeaderBoard");
    }
}

#[test]
fn fixture_unknown_type_decodes_to_unknown() {
    let json = r#"{
        "type": "adminBroadcast",
        "adminBroadcast": {"text": "server restarting soon"}
    }"#;
    let msg: ServerMessage = serde_json::from_str(json).expect("deserialize");
    assert_eq!(msg, ServerMessage::Unknown);
}

#[test]
fn fixture_extra_fields_are_tolerated() {
    // Servers may grow new payload fields; old clients must not choke.
    let json = r#"{
        "type": "currentResult",
        "currentResult": {"nickName": "ada", "score": 10, "rank": 4},
        "timestamp": "2026-08-01T12:00:00Z"
    }"#;
    let msg: ServerMessage = serde_json::from_str(json).expect("deserialize");
    if let ServerMessage::CurrentResult { current_result } = msg {
        assert_eq!(current_result.score, 10);
    } else {
        panic!("expected CurrentResult");
    }
}

#[test]
fn fixture_missing_payload_is_an_error() {
    // A known tag with its payload missing is malformed, not Unknown.
    let json = r#"{"type":"currentResult"}"#;
    let result: Result<ServerMessage, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

// ════════════════════════════════════════════════════════════════════
// Tag format verification
// ════════════════════════════════════════════════════════════════════

#[test]
fn unit_announcements_serialize_with_only_the_type_field() {
    let cases = [
        (ServerMessage::WaitingStartSignal, "waitingStartSignal"),
        (ServerMessage::OpenUserRegistration, "openUserRegistration"),
        (ServerMessage::GameInProgress, "gameInProgress"),
    ];
    for (msg, expected_tag) in &cases {
        let json = serde_json::to_string(msg).expect("serialize");
        let val: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(&val["type"], expected_tag);
        let obj = val.as_object().expect("object");
        assert_eq!(
            obj.len(),
            1,
            "{expected_tag} should serialize with only the 'type' field"
        );
    }
}

#[test]
fn payload_variants_use_inline_camel_case_keys() {
    let msg = ServerMessage::CurrentResult {
        current_result: attempt("ada", 1),
    };
    let json = serde_json::to_string(&msg).expect("serialize");
    let val: serde_json::Value = serde_json::from_str(&json).expect("parse");
    assert_eq!(val["type"], "currentResult");
    assert!(val.get("currentResult").is_some());
    assert!(val.get("data").is_none(), "no content envelope expected");

    let msg = ServerMessage::LeaderBoard {
        leader_board: vec![attempt("ada", 1)],
    };
    let json = serde_json::to_string(&msg).expect("serialize");
    let val: serde_json::Value = serde_json::from_str(&json).expect("parse");
    assert_eq!(val["type"], "leaderBoard");
    assert!(val.get("leaderBoard").is_some());
}

// ════════════════════════════════════════════════════════════════════
// AttemptRecord
// ════════════════════════════════════════════════════════════════════

#[test]
fn attempt_record_email_skipped_when_absent() {
    let record = attempt("ada", 100);
    let json = serde_json::to_string(&record).expect("serialize");
    assert!(
        !json.contains("email"),
        "expected email to be skipped, got {json}"
    );
    let deser: AttemptRecord = serde_json::from_str(&json).expect("deserialize");
    assert!(deser.email.is_none());
}

#[test]
fn remark_bands_cover_every_threshold() {
    let cases: [(i64, &str); 17] = [
        (-50, "What to say. Maybe next time."),
        (0, "What to say. Maybe next time."),
        (199, "What to say. Maybe next time."),
        (200, "Not bad but you can do more!"),
        (399, "Not bad but you can do more!"),
        (400, "Nice one."),
        (699, "Nice one."),
        (700, "Congratulations!"),
        (999, "Congratulations!"),
        (1000, "Boooom! This is how it goes!"),
        (1299, "Boooom! This is how it goes!"),
        (1300, "Unbeatable!"),
        (1599, "Unbeatable!"),
        (1600, "God mode!"),
        (1999, "God mode!"),
        (2000, "How did you do this??!!"),
        (i64::MAX, "How did you do this??!!"),
    ];
    for (score, expected) in cases {
        assert_eq!(
            attempt("ada", score).remark(),
            expected,
            "wrong remark for score {score}"
        );
    }
}

// ════════════════════════════════════════════════════════════════════
// RegistrationRecord
// ════════════════════════════════════════════════════════════════════

#[test]
fn registration_record_minimal_wire_shape() {
    let record = RegistrationRecord::named("ada");
    let json = serde_json::to_string(&record).expect("serialize");
    assert_eq!(json, r#"{"nickName":"ada"}"#);
}

#[test]
fn registration_record_full_fields_use_camel_case() {
    let record = RegistrationRecord::named("ada")
        .with_email("ada@example.com")
        .with_desc("first timer")
        .with_phone("555-0100");
    let json = serde_json::to_string(&record).expect("serialize");
    let val: serde_json::Value = serde_json::from_str(&json).expect("parse");
    assert_eq!(val["nickName"], "ada");
    assert_eq!(val["email"], "ada@example.com");
    assert_eq!(val["desc"], "first timer");
    assert_eq!(val["phone"], "555-0100");
}

#[test]
fn registration_record_is_empty() {
    assert!(RegistrationRecord::default().is_empty());
    assert!(!RegistrationRecord::named("ada").is_empty());

    let mut extra_only = RegistrationRecord::default();
    extra_only
        .extra
        .insert("company".into(), serde_json::json!("acme"));
    assert!(!extra_only.is_empty());
}

#[test]
fn registration_record_extra_fields_ride_along() {
    let mut record = RegistrationRecord::named("ada");
    record
        .extra
        .insert("company".into(), serde_json::json!("acme"));

    let json = serde_json::to_string(&record).expect("serialize");
    let val: serde_json::Value = serde_json::from_str(&json).expect("parse");
    // Flattened at the top level, beside the known fields.
    assert_eq!(val["company"], "acme");

    let deser: RegistrationRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(deser.extra["company"], "acme");
    assert_eq!(deser.nick_name.as_deref(), Some("ada"));
}

#[test]
fn registration_record_accepts_alternate_deployment_shape() {
    // Some deployments send a userName field plus placeholder desc/phone.
    let json = r#"{
        "userName": "userName",
        "email": "x@example.com",
        "desc": "desc",
        "phone": null
    }"#;
    let record: RegistrationRecord = serde_json::from_str(json).expect("deserialize");
    assert!(record.nick_name.is_none());
    assert_eq!(record.email.as_deref(), Some("x@example.com"));
    assert_eq!(record.desc.as_deref(), Some("desc"));
    assert!(record.phone.is_none());
    assert_eq!(record.extra["userName"], "userName");
}
