#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Integration-style client tests for the Scorewall client.
//!
//! Uses the shared `MockConnector` from `tests/common` to script dial
//! outcomes and server frames, then verifies that `ScorewallClient`
//! tracks the session, aggregates the board, reconnects, and delivers
//! events in order.

mod common;

use std::time::Duration;

use scorewall_client::protocol::{ClientMessage, RegistrationRecord};
use scorewall_client::{
    ConnectionState, GamePhase, ScorewallClient, ScorewallConfig, ScorewallEvent,
};
use tokio::sync::mpsc;

use common::{
    attempt, attempt_with_email, current_result_json, game_in_progress_json, leader_board_json,
    open_registration_json, waiting_start_json, Dial, MockConnector, MockHandles,
};

const PRIMARY_URL: &str = "ws://primary.test/ws";
const BACKUP_URL: &str = "ws://backup.test/ws";

// ════════════════════════════════════════════════════════════════════
// Helper: start a mock client with scripted dial outcomes
// ════════════════════════════════════════════════════════════════════

/// Start a client against a scripted connector with default settings.
fn start_client(
    script: Vec<Dial>,
) -> (
    ScorewallClient,
    mpsc::Receiver<ScorewallEvent>,
    MockHandles,
) {
    start_client_with(script, ScorewallConfig::new(PRIMARY_URL))
}

/// Start a client against a scripted connector with custom settings.
fn start_client_with(
    script: Vec<Dial>,
    config: ScorewallConfig,
) -> (
    ScorewallClient,
    mpsc::Receiver<ScorewallEvent>,
    MockHandles,
) {
    let (connector, handles) = MockConnector::new(script);
    let (client, events) = ScorewallClient::start(connector, config);
    (client, events, handles)
}

/// Consume the next event and assert it is `Connected`.
async fn expect_connected(rx: &mut mpsc::Receiver<ScorewallEvent>) {
    let ev = rx.recv().await.expect("expected Connected event");
    assert!(
        matches!(ev, ScorewallEvent::Connected),
        "expected Connected, got {ev:?}"
    );
}

// ════════════════════════════════════════════════════════════════════
// Full dashboard session flow
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn full_session_flow_phases_results_and_board() {
    // NOTE: Scripted frames are consumed immediately, so session snapshots
    // are only asserted after the final event; the per-step assertions go
    // through the event payloads instead.
    let (mut client, mut events, handles) = start_client(vec![Dial::Accept(vec![
        Some(Ok(waiting_start_json())),
        Some(Ok(open_registration_json())),
        Some(Ok(game_in_progress_json())),
        Some(Ok(current_result_json(attempt_with_email(
            "ada",
            742,
            "ada@example.com",
        )))),
        Some(Ok(current_result_json(attempt("bob", 1100)))),
        Some(Ok(leader_board_json(vec![
            attempt_with_email("ada", 742, "ada@example.com"),
            attempt("bob", 1100),
            attempt("ada", 900),
        ]))),
    ])]);

    expect_connected(&mut events).await;

    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::WaitingStart));

    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::RegistrationOpen));

    // Register while the window is open.
    client
        .submit_registration(RegistrationRecord::named("ada").with_email("ada@example.com"))
        .expect("submit_registration");

    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::GameInProgress));

    let ev = events.recv().await.expect("event");
    if let ScorewallEvent::AttemptPosted { result } = ev {
        assert_eq!(result.nick_name, "ada");
        assert_eq!(result.score, 742);
        assert_eq!(result.remark(), "Congratulations!");
    } else {
        panic!("expected AttemptPosted, got {ev:?}");
    }

    let ev = events.recv().await.expect("event");
    if let ScorewallEvent::AttemptPosted { result } = ev {
        assert_eq!(result.nick_name, "bob");
        assert_eq!(result.remark(), "Boooom! This is how it goes!");
    } else {
        panic!("expected AttemptPosted, got {ev:?}");
    }

    let ev = events.recv().await.expect("event");
    if let ScorewallEvent::LeaderboardUpdated { players } = ev {
        // Duplicate attempts collapse per player, first-seen order.
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].nick_name, "ada");
        assert_eq!(players[0].best_score, 900);
        assert_eq!(players[0].attempts.len(), 2);
        assert_eq!(players[0].email.as_deref(), Some("ada@example.com"));
        assert_eq!(players[1].nick_name, "bob");
        assert_eq!(players[1].best_score, 1100);
    } else {
        panic!("expected LeaderboardUpdated, got {ev:?}");
    }

    // All frames processed: the snapshot observers agree with the events.
    assert!(client.is_connected());
    assert_eq!(client.current_phase(), GamePhase::InProgress);
    assert!(client.registration_disabled());
    assert_eq!(client.last_result().map(|r| r.score), Some(1100));
    assert_eq!(client.leaderboard().len(), 2);

    // Verify the registration went out on the wire.
    tokio::time::sleep(Duration::from_millis(50)).await;
    {
        let messages = handles.sent.lock().unwrap();
        assert_eq!(messages.len(), 1, "messages were: {messages:?}");
        let msg: ClientMessage =
            serde_json::from_str(&messages[0]).expect("parse registration message");
        let ClientMessage::User { user } = msg;
        assert_eq!(user.nick_name.as_deref(), Some("ada"));
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Reconnection keeps the board, clears the result line
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn reconnect_preserves_board_and_clears_result() {
    let config = ScorewallConfig::new(PRIMARY_URL).with_initial_backoff(Duration::from_millis(50));
    let (mut client, mut events, handles) = start_client_with(
        vec![
            Dial::Accept(vec![
                Some(Ok(open_registration_json())),
                Some(Ok(current_result_json(attempt("ada", 500)))),
                Some(Ok(leader_board_json(vec![
                    attempt("ada", 500),
                    attempt_with_email("ada", 450, "ada@example.com"),
                ]))),
                // Server closes the connection cleanly.
                None,
            ]),
            Dial::Accept(vec![]),
        ],
        config,
    );

    expect_connected(&mut events).await;
    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::RegistrationOpen));
    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::AttemptPosted { .. }));
    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::LeaderboardUpdated { .. }));

    let ev = events.recv().await.expect("event");
    assert!(
        matches!(ev, ScorewallEvent::Disconnected { reason: None }),
        "clean close should carry no reason, got {ev:?}"
    );

    // The client redials on its own after the backoff.
    expect_connected(&mut events).await;
    assert_eq!(handles.dialed.lock().unwrap().len(), 2);

    // Stale result line cleared; board and phase wait for re-announcement.
    assert!(client.last_result().is_none());
    assert_eq!(client.current_phase(), GamePhase::RegistrationOpen);
    let board = client.leaderboard();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].best_score, 500);
    assert_eq!(board[0].attempts.len(), 2);
    assert_eq!(board[0].email.as_deref(), Some("ada@example.com"));

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Backoff recovery after a server restart
// ════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn backoff_recovers_after_server_restart() {
    let start = tokio::time::Instant::now();
    let (mut client, mut events, handles) = start_client(vec![
        Dial::Accept(vec![Some(Ok(game_in_progress_json())), None]),
        Dial::Refuse,
        Dial::Accept(vec![Some(Ok(waiting_start_json()))]),
    ]);

    expect_connected(&mut events).await;
    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::GameInProgress));
    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::Disconnected { reason: None }));

    // One second to the refused retry, two more to the one that lands.
    expect_connected(&mut events).await;
    assert_eq!(start.elapsed(), Duration::from_millis(3000));

    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::WaitingStart));
    assert_eq!(client.current_phase(), GamePhase::AwaitingStart);
    assert_eq!(handles.dialed.lock().unwrap().len(), 3);

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Endpoint switching
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn switch_endpoint_moves_to_the_new_server() {
    let (mut client, mut events, handles) = start_client(vec![
        Dial::Accept(vec![
            Some(Ok(current_result_json(attempt("ada", 300)))),
            Some(Ok(leader_board_json(vec![attempt("ada", 300)]))),
        ]),
        Dial::Accept(vec![Some(Ok(waiting_start_json()))]),
    ]);

    expect_connected(&mut events).await;
    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::AttemptPosted { .. }));
    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::LeaderboardUpdated { .. }));

    client.switch_endpoint(BACKUP_URL).expect("switch_endpoint");

    let ev = events.recv().await.expect("event");
    if let ScorewallEvent::Disconnected { reason } = ev {
        assert_eq!(reason.as_deref(), Some("endpoint switched"));
    } else {
        panic!("expected Disconnected, got {ev:?}");
    }

    // The switch dials immediately, no backoff wait.
    expect_connected(&mut events).await;
    let ev = events.recv().await.expect("event");
    assert!(matches!(ev, ScorewallEvent::WaitingStart));

    {
        let dialed = handles.dialed.lock().unwrap();
        assert_eq!(*dialed, vec![PRIMARY_URL.to_string(), BACKUP_URL.to_string()]);
    }
    assert!(handles.closed.load(std::sync::atomic::Ordering::Relaxed));

    // Same reset rules as any fresh connection.
    assert!(client.last_result().is_none());
    assert_eq!(client.leaderboard().len(), 1);

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Watch channels and shutdown
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn watch_channels_follow_connection_and_close_on_shutdown() {
    let (mut client, mut events, _handles) =
        start_client(vec![Dial::Accept(vec![Some(Ok(open_registration_json()))])]);

    let mut conn_rx = client.watch_connection();
    let mut sess_rx = client.watch_session();

    conn_rx
        .wait_for(ConnectionState::is_connected)
        .await
        .expect("connected");
    sess_rx
        .wait_for(|s| s.phase == GamePhase::RegistrationOpen)
        .await
        .expect("registration open");
    assert!(!client.registration_disabled());

    client.shutdown().await;

    // The final state change is observable, then the channel closes.
    conn_rx.changed().await.expect("final state change");
    assert_eq!(*conn_rx.borrow_and_update(), ConnectionState::Disconnected);
    assert!(conn_rx.changed().await.is_err());

    assert!(!client.is_connected());
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);

    // Event stream: everything delivered, Disconnected last, then closed.
    let mut seen = Vec::new();
    while let Some(ev) = events.recv().await {
        seen.push(ev);
    }
    assert!(matches!(seen.first(), Some(ScorewallEvent::Connected)));
    assert!(matches!(
        seen.last(),
        Some(ScorewallEvent::Disconnected { .. })
    ));
}
