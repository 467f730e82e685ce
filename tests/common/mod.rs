#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Shared test utilities for Scorewall client integration tests.
//!
//! Provides a scripted [`MockConnector`] whose transports replay server
//! frames, plus helper functions for building announcement JSON strings.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use scorewall_client::protocol::{AttemptRecord, ServerMessage};
use scorewall_client::{Connector, ScorewallError, Transport};

// ── MockTransport ───────────────────────────────────────────────────

/// A mock transport that records sent messages and replays scripted
/// server frames.
pub struct MockTransport {
    /// Frames that `recv()` will yield in order. An explicit `None`
    /// entry signals a clean transport close.
    incoming: VecDeque<Option<Result<String, ScorewallError>>>,
    /// Recorded outgoing messages, shared across reconnects.
    sent: Arc<StdMutex<Vec<String>>>,
    /// Whether `close()` was called on any transport.
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), ScorewallError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, ScorewallError>> {
        if let Some(item) = self.incoming.pop_front() {
            item
        } else {
            // Script exhausted: hang so the connection stays up until
            // the client shuts down.
            std::future::pending().await
        }
    }

    async fn close(&mut self) -> Result<(), ScorewallError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

// ── MockConnector ───────────────────────────────────────────────────

/// What a single scripted dial attempt should do.
pub enum Dial {
    /// Yield a transport that replays these frames.
    Accept(Vec<Option<Result<String, ScorewallError>>>),
    /// Fail the dial immediately (connection refused).
    Refuse,
}

/// Shared probes into a [`MockConnector`] and its transports.
pub struct MockHandles {
    /// Every URL that was dialed, in order.
    pub dialed: Arc<StdMutex<Vec<String>>>,
    /// Every message sent on any transport, in order.
    pub sent: Arc<StdMutex<Vec<String>>>,
    /// Whether `close()` was called on any transport.
    pub closed: Arc<AtomicBool>,
}

/// A mock connector that replays scripted dial outcomes. Once the
/// script is exhausted, further dials hang forever.
pub struct MockConnector {
    script: VecDeque<Dial>,
    dialed: Arc<StdMutex<Vec<String>>>,
    sent: Arc<StdMutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MockConnector {
    /// Create a connector with the given dial script.
    ///
    /// Returns the connector plus shared handles for inspecting dialed
    /// URLs, sent messages, and whether close was called.
    pub fn new(script: Vec<Dial>) -> (Self, MockHandles) {
        let handles = MockHandles {
            dialed: Arc::new(StdMutex::new(Vec::new())),
            sent: Arc::new(StdMutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        };
        let connector = Self {
            script: VecDeque::from(script),
            dialed: Arc::clone(&handles.dialed),
            sent: Arc::clone(&handles.sent),
            closed: Arc::clone(&handles.closed),
        };
        (connector, handles)
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&mut self, url: &str) -> Result<MockTransport, ScorewallError> {
        self.dialed.lock().unwrap().push(url.to_string());
        match self.script.pop_front() {
            Some(Dial::Accept(incoming)) => Ok(MockTransport {
                incoming: VecDeque::from(incoming),
                sent: Arc::clone(&self.sent),
                closed: Arc::clone(&self.closed),
            }),
            Some(Dial::Refuse) => Err(ScorewallError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            None => std::future::pending().await,
        }
    }
}

// ── JSON helper functions ───────────────────────────────────────────

/// Returns an attempt record without an email address.
pub fn attempt(nick: &str, score: i64) -> AttemptRecord {
    AttemptRecord {
        nick_name: nick.into(),
        score,
        email: None,
    }
}

/// Returns an attempt record with an email address.
pub fn attempt_with_email(nick: &str, score: i64, email: &str) -> AttemptRecord {
    AttemptRecord {
        nick_name: nick.into(),
        score,
        email: Some(email.into()),
    }
}

/// Returns the JSON string for a `WaitingStartSignal` announcement.
pub fn waiting_start_json() -> String {
    serde_json::to_string(&ServerMessage::WaitingStartSignal)
        .expect("waiting_start_json serialization")
}

/// Returns the JSON string for an `OpenUserRegistration` announcement.
pub fn open_registration_json() -> String {
    serde_json::to_string(&ServerMessage::OpenUserRegistration)
        .expect("open_registration_json serialization")
}

/// Returns the JSON string for a `GameInProgress` announcement.
pub fn game_in_progress_json() -> String {
    serde_json::to_string(&ServerMessage::GameInProgress)
        .expect("game_in_progress_json serialization")
}

/// Returns the JSON string for a `CurrentResult` announcement.
pub fn current_result_json(current_result: AttemptRecord) -> String {
    serde_json::to_string(&ServerMessage::CurrentResult { current_result })
        .expect("current_result_json serialization")
}

/// Returns the JSON string for a `LeaderBoard` announcement.
pub fn leader_board_json(leader_board: Vec<AttemptRecord>) -> String {
    serde_json::to_string(&ServerMessage::LeaderBoard { leader_board })
        .expect("leader_board_json serialization")
}
