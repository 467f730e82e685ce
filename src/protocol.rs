//! Wire-compatible protocol types for the Scorewall dashboard protocol.
//!
//! Every frame is a single JSON object with a camelCase `type` discriminator
//! and any payload fields beside it (not nested under a content key):
//!
//! ```json
//! {"type": "currentResult", "currentResult": {"nickName": "ada", "score": 1337}}
//! ```
//!
//! Inbound decoding is deliberately lenient: a frame whose `type` this
//! client version does not recognize decodes to [`ServerMessage::Unknown`]
//! instead of failing, so newer servers never break older dashboards.

use serde::{Deserialize, Serialize};

// ── Records ─────────────────────────────────────────────────────────

/// One scored attempt as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Player name shown on the dashboard; also the leaderboard grouping key.
    pub nick_name: String,
    /// Raw score for this single attempt.
    pub score: i64,
    /// Contact address, when the player provided one at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AttemptRecord {
    /// Commentary line for this attempt's score.
    ///
    /// The bands are fixed by the dashboard design; embedders display the
    /// returned string verbatim next to the current result.
    pub fn remark(&self) -> &'static str {
        match self.score {
            s if s < 200 => "What to say. Maybe next time.",
            s if s < 400 => "Not bad but you can do more!",
            s if s < 700 => "Nice one.",
            s if s < 1000 => "Congratulations!",
            s if s < 1300 => "Boooom! This is how it goes!",
            s if s < 1600 => "Unbeatable!",
            s if s < 2000 => "God mode!",
            _ => "How did you do this??!!",
        }
    }
}

/// A user-entered registration record, forwarded as entered.
///
/// Deployments disagree on the exact field set (some send only a name and
/// email, others add fixed `desc`/`phone` placeholders), so every known
/// field is optional and anything else the embedder supplies rides along in
/// `extra`. Unset fields are omitted from the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Deployment-specific fields serialized at the same level as the
    /// known ones.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RegistrationRecord {
    /// Creates a record with only the player name set.
    pub fn named(nick_name: impl Into<String>) -> Self {
        Self {
            nick_name: Some(nick_name.into()),
            ..Self::default()
        }
    }

    /// Sets the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the free-form description field some deployments expect.
    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Sets the phone placeholder field some deployments expect.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// True when no field is set at all; such a record serializes to `{}`
    /// and is rejected by the submit path.
    pub fn is_empty(&self) -> bool {
        self.nick_name.is_none()
            && self.email.is_none()
            && self.desc.is_none()
            && self.phone.is_none()
            && self.extra.is_empty()
    }
}

// ── Messages ────────────────────────────────────────────────────────

/// Message types sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Submit a registration record for the next game window.
    User {
        /// The record as entered; forwarded without further validation.
        user: RegistrationRecord,
    },
}

/// Message types sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Registration is closed and the game has not started yet.
    WaitingStartSignal,
    /// The registration window is open.
    OpenUserRegistration,
    /// A game is currently running.
    GameInProgress,
    /// The most recently completed attempt's outcome.
    #[serde(rename_all = "camelCase")]
    CurrentResult {
        current_result: AttemptRecord,
    },
    /// A full leaderboard snapshot of raw per-attempt records.
    /// Replaces any previous snapshot wholesale.
    #[serde(rename_all = "camelCase")]
    LeaderBoard {
        leader_board: Vec<AttemptRecord>,
    },
    /// Catch-all for discriminators this client version does not know.
    /// Decoding one is a no-op; the current state stays untouched.
    #[serde(other)]
    Unknown,
}
