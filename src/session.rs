//! Session state machine and leaderboard aggregation.
//!
//! Everything in this module is pure and synchronous: the supervisor task
//! feeds decoded [`ServerMessage`]s into [`SessionState::apply`] and
//! publishes the result; embedders observe snapshots through
//! [`watch_session`](crate::ScorewallClient::watch_session). There are no
//! invalid transitions: any message is accepted in any phase, and a
//! message this client version does not know is a no-op.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::ScorewallEvent;
use crate::protocol::{AttemptRecord, ServerMessage};

// ── Phase ───────────────────────────────────────────────────────────

/// The three-way game lifecycle state announced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    /// Registration closed, game not started. The initial phase.
    #[default]
    AwaitingStart,
    /// The registration window is open.
    RegistrationOpen,
    /// A game is running.
    InProgress,
}

impl GamePhase {
    /// True in every phase except [`RegistrationOpen`](Self::RegistrationOpen).
    pub fn registration_disabled(&self) -> bool {
        !matches!(self, Self::RegistrationOpen)
    }
}

// ── Player summaries ────────────────────────────────────────────────

/// Aggregated view of one player's attempts within a leaderboard snapshot.
///
/// Derived by [`group_by_player`]; never mutated independently.
/// `best_score` always equals the maximum score over `attempts`, and
/// `attempts` preserves the snapshot's arrival order for this player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Grouping key: the player name, matched case-sensitively.
    pub nick_name: String,
    /// Supplied by the first of this player's records that carries one.
    /// Later records with a different spelling do not overwrite it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Highest score over all of this player's attempts in the snapshot.
    pub best_score: i64,
    /// Every raw attempt for this player, in arrival order.
    pub attempts: Vec<AttemptRecord>,
}

/// Groups a snapshot's raw attempt records into per-player summaries.
///
/// A pure function of the input sequence, applied fresh to every snapshot
/// (never incrementally across snapshots). The output order is first-seen
/// player order, not score order; ranking is left to the embedder.
pub fn group_by_player(records: &[AttemptRecord]) -> Vec<PlayerSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut players: Vec<PlayerSummary> = Vec::new();

    for record in records {
        match index.get(record.nick_name.as_str()) {
            Some(&slot) => {
                if let Some(summary) = players.get_mut(slot) {
                    summary.best_score = summary.best_score.max(record.score);
                    if summary.email.is_none() {
                        summary.email = record.email.clone();
                    }
                    summary.attempts.push(record.clone());
                }
            }
            None => {
                index.insert(record.nick_name.as_str(), players.len());
                players.push(PlayerSummary {
                    nick_name: record.nick_name.clone(),
                    email: record.email.clone(),
                    best_score: record.score,
                    attempts: vec![record.clone()],
                });
            }
        }
    }

    players
}

// ── Session state ───────────────────────────────────────────────────

/// Live session state as reconstructed from the message stream.
///
/// The supervisor task is the sole writer. Connection-level events touch
/// only the volatile portion (see [`reset_for_new_connection`]); a dropped
/// connection changes nothing here, so stale state stays on display while
/// the connection indicator reflects the outage.
///
/// [`reset_for_new_connection`]: SessionState::reset_for_new_connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Current game lifecycle phase.
    pub phase: GamePhase,
    /// The most recently posted attempt, if any since the registration
    /// window last opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<AttemptRecord>,
    /// Aggregated leaderboard from the latest snapshot, in first-seen
    /// player order.
    #[serde(default)]
    pub leaderboard: Vec<PlayerSummary>,
}

impl SessionState {
    /// Creates the initial state: `AwaitingStart`, no result, empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one decoded server message and returns the event to emit,
    /// or `None` when the message is a no-op.
    pub fn apply(&mut self, message: ServerMessage) -> Option<ScorewallEvent> {
        match message {
            ServerMessage::WaitingStartSignal => {
                self.phase = GamePhase::AwaitingStart;
                Some(ScorewallEvent::WaitingStart)
            }
            ServerMessage::OpenUserRegistration => {
                self.phase = GamePhase::RegistrationOpen;
                self.last_result = None;
                Some(ScorewallEvent::RegistrationOpen)
            }
            ServerMessage::GameInProgress => {
                self.phase = GamePhase::InProgress;
                Some(ScorewallEvent::GameInProgress)
            }
            ServerMessage::CurrentResult { current_result } => {
                self.last_result = Some(current_result.clone());
                Some(ScorewallEvent::AttemptPosted {
                    result: current_result,
                })
            }
            ServerMessage::LeaderBoard { leader_board } => {
                self.leaderboard = group_by_player(&leader_board);
                Some(ScorewallEvent::LeaderboardUpdated {
                    players: self.leaderboard.clone(),
                })
            }
            ServerMessage::Unknown => None,
        }
    }

    /// Clears the volatile portion when a fresh connection opens.
    ///
    /// Only the last result clears: a stale result line actively
    /// misleads, while the phase and leaderboard merely wait for the
    /// server to re-announce them. Returns true when anything changed.
    pub fn reset_for_new_connection(&mut self) -> bool {
        self.last_result.take().is_some()
    }

    /// True when the registration form should be disabled, i.e. in every
    /// phase except `RegistrationOpen`.
    pub fn registration_disabled(&self) -> bool {
        self.phase.registration_disabled()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn attempt(nick: &str, score: i64) -> AttemptRecord {
        AttemptRecord {
            nick_name: nick.to_string(),
            score,
            email: None,
        }
    }

    fn attempt_with_email(nick: &str, score: i64, email: &str) -> AttemptRecord {
        AttemptRecord {
            nick_name: nick.to_string(),
            score,
            email: Some(email.to_string()),
        }
    }

    #[test]
    fn initial_state_awaits_start() {
        let state = SessionState::new();
        assert_eq!(state.phase, GamePhase::AwaitingStart);
        assert!(state.last_result.is_none());
        assert!(state.leaderboard.is_empty());
        assert!(state.registration_disabled());
    }

    #[test]
    fn phase_announcements_move_the_phase() {
        let mut state = SessionState::new();

        let event = state.apply(ServerMessage::OpenUserRegistration);
        assert_eq!(state.phase, GamePhase::RegistrationOpen);
        assert_eq!(event, Some(ScorewallEvent::RegistrationOpen));

        let event = state.apply(ServerMessage::GameInProgress);
        assert_eq!(state.phase, GamePhase::InProgress);
        assert_eq!(event, Some(ScorewallEvent::GameInProgress));

        let event = state.apply(ServerMessage::WaitingStartSignal);
        assert_eq!(state.phase, GamePhase::AwaitingStart);
        assert_eq!(event, Some(ScorewallEvent::WaitingStart));
    }

    #[test]
    fn registration_disabled_outside_registration_window() {
        let mut state = SessionState::new();
        assert!(state.registration_disabled());

        state.apply(ServerMessage::OpenUserRegistration);
        assert!(!state.registration_disabled());

        state.apply(ServerMessage::GameInProgress);
        assert!(state.registration_disabled());
    }

    #[test]
    fn current_result_is_stored_without_changing_phase() {
        let mut state = SessionState::new();
        state.apply(ServerMessage::GameInProgress);

        let event = state.apply(ServerMessage::CurrentResult {
            current_result: attempt("ada", 1337),
        });

        assert_eq!(state.phase, GamePhase::InProgress);
        assert_eq!(state.last_result, Some(attempt("ada", 1337)));
        assert_eq!(
            event,
            Some(ScorewallEvent::AttemptPosted {
                result: attempt("ada", 1337),
            })
        );
    }

    #[test]
    fn opening_registration_clears_the_last_result() {
        let mut state = SessionState::new();
        state.apply(ServerMessage::CurrentResult {
            current_result: attempt("ada", 900),
        });
        assert!(state.last_result.is_some());

        state.apply(ServerMessage::OpenUserRegistration);
        assert!(state.last_result.is_none());
    }

    #[test]
    fn unknown_message_changes_nothing() {
        let mut state = SessionState::new();
        state.apply(ServerMessage::GameInProgress);
        state.apply(ServerMessage::CurrentResult {
            current_result: attempt("ada", 500),
        });
        let before = state.clone();

        let event = state.apply(ServerMessage::Unknown);

        assert_eq!(event, None);
        assert_eq!(state, before);
    }

    #[test]
    fn snapshot_replaces_previous_leaderboard_wholesale() {
        let mut state = SessionState::new();
        state.apply(ServerMessage::LeaderBoard {
            leader_board: vec![attempt("ada", 10)],
        });
        state.apply(ServerMessage::LeaderBoard {
            leader_board: vec![attempt("brin", 5)],
        });

        assert_eq!(state.leaderboard.len(), 1);
        assert_eq!(
            state.leaderboard.first().map(|p| p.nick_name.as_str()),
            Some("brin")
        );
    }

    #[test]
    fn reset_for_new_connection_clears_only_the_result() {
        let mut state = SessionState::new();
        state.apply(ServerMessage::GameInProgress);
        state.apply(ServerMessage::LeaderBoard {
            leader_board: vec![attempt("ada", 700)],
        });
        state.apply(ServerMessage::CurrentResult {
            current_result: attempt("brin", 300),
        });

        assert!(state.reset_for_new_connection());

        assert!(state.last_result.is_none());
        assert_eq!(state.phase, GamePhase::InProgress);
        assert_eq!(state.leaderboard.len(), 1);

        // Nothing left to clear the second time.
        assert!(!state.reset_for_new_connection());
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let records = vec![attempt("ada", 10), attempt("brin", 50), attempt("ada", 30)];
        let players = group_by_player(&records);

        let order: Vec<&str> = players.iter().map(|p| p.nick_name.as_str()).collect();
        assert_eq!(order, vec!["ada", "brin"]);
        assert_eq!(players.first().map(|p| p.best_score), Some(30));
    }

    #[test]
    fn best_score_is_the_maximum_regardless_of_arrival_order() {
        let ascending = group_by_player(&[
            attempt("ada", 100),
            attempt("ada", 200),
            attempt("ada", 300),
        ]);
        let descending = group_by_player(&[
            attempt("ada", 300),
            attempt("ada", 200),
            attempt("ada", 100),
        ]);

        assert_eq!(ascending.first().map(|p| p.best_score), Some(300));
        assert_eq!(descending.first().map(|p| p.best_score), Some(300));
    }

    #[test]
    fn attempts_preserve_arrival_order_per_player() {
        let players = group_by_player(&[
            attempt("ada", 300),
            attempt("brin", 999),
            attempt("ada", 100),
            attempt("ada", 200),
        ]);

        let ada = players.iter().find(|p| p.nick_name == "ada").unwrap();
        let scores: Vec<i64> = ada.attempts.iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![300, 100, 200]);
    }

    #[test]
    fn first_email_seen_wins() {
        let players = group_by_player(&[
            attempt("ada", 100),
            attempt_with_email("ada", 200, "ada@example.com"),
            attempt_with_email("ada", 300, "other@example.com"),
        ]);

        assert_eq!(
            players.first().and_then(|p| p.email.as_deref()),
            Some("ada@example.com")
        );
    }

    #[test]
    fn player_names_match_case_sensitively() {
        let players = group_by_player(&[attempt("Ada", 100), attempt("ada", 200)]);
        assert_eq!(players.len(), 2);
    }

    #[test]
    fn grouping_is_idempotent_on_its_own_output() {
        let records = vec![
            attempt("ada", 10),
            attempt("brin", 50),
            attempt("ada", 30),
            attempt_with_email("brin", 40, "brin@example.com"),
        ];
        let once = group_by_player(&records);

        let flattened: Vec<AttemptRecord> = once
            .iter()
            .flat_map(|p| p.attempts.iter().cloned())
            .collect();
        let twice = group_by_player(&flattened);

        assert_eq!(once, twice);
    }

    #[test]
    fn empty_snapshot_yields_empty_board() {
        assert!(group_by_player(&[]).is_empty());
    }
}
