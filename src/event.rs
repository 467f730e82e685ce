//! Consumer-facing events emitted by the client.
//!
//! Events arrive on the bounded receiver returned by
//! [`ScorewallClient::start`](crate::ScorewallClient::start), in the order
//! the supervisor observed them. Lifecycle events ([`Connected`] and
//! [`Disconnected`]) are always delivered; data events may be dropped when
//! the receiver falls behind.
//!
//! [`Connected`]: ScorewallEvent::Connected
//! [`Disconnected`]: ScorewallEvent::Disconnected

use crate::protocol::AttemptRecord;
use crate::session::PlayerSummary;

/// Events emitted by the client to the embedding layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScorewallEvent {
    /// A connection to the server was established.
    ///
    /// The session's volatile state (the last result) has been cleared;
    /// the server is expected to follow with a phase announcement.
    Connected,
    /// The connection dropped or could not be kept alive.
    ///
    /// The client keeps retrying on its own; this is informational, not
    /// fatal.
    Disconnected {
        /// Cause, when one is known (transport error text, shutdown).
        reason: Option<String>,
    },
    /// The server announced that registration is closed and the game has
    /// not started yet.
    WaitingStart,
    /// The server opened the registration window. Any previously shown
    /// result has been cleared.
    RegistrationOpen,
    /// The server announced a running game.
    GameInProgress,
    /// A completed attempt was posted as the current result.
    AttemptPosted {
        /// The attempt now shown as the dashboard's current result.
        result: AttemptRecord,
    },
    /// A fresh leaderboard snapshot arrived and was aggregated.
    LeaderboardUpdated {
        /// Per-player summaries in first-seen order.
        players: Vec<PlayerSummary>,
    },
}
