//! # Scorewall Client
//!
//! Transport-agnostic Rust client for Scorewall live game dashboards.
//!
//! This crate provides a high-level async client that follows a timed
//! competitive game from the spectator side: it maintains a resilient
//! connection to the dashboard server, tracks the announced game phase,
//! aggregates raw attempt snapshots into a per-player leaderboard, and
//! submits player registrations while the registration window is open.
//!
//! ## Features
//!
//! - **Transport-agnostic** — implement the [`Transport`] and [`Connector`]
//!   traits for any backend that moves text frames
//! - **Resilient** — automatic reconnect with capped doubling backoff;
//!   a lost server never kills the client
//! - **Wire-compatible** — all protocol types match the server's JSON
//!   announcements exactly
//! - **Event-driven** — receive typed [`ScorewallEvent`]s via a channel,
//!   or observe connection and session state through watch channels
//! - **WebSocket built-in** — default `transport-websocket` feature
//!   provides `WebSocketConnector`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scorewall_client::{ScorewallClient, ScorewallConfig, ScorewallEvent, WebSocketConnector};
//!
//! #[tokio::main]
//! async fn main() {
//!     let url = ScorewallConfig::default_endpoint("localhost", 8080);
//!     let (mut client, mut events) =
//!         ScorewallClient::start(WebSocketConnector, ScorewallConfig::new(url));
//!
//!     // Follow the stream until the first full leaderboard arrives.
//!     while let Some(event) = events.recv().await {
//!         if let ScorewallEvent::LeaderboardUpdated { players } = event {
//!             for player in &players {
//!                 println!("{}: {}", player.nick_name, player.best_score);
//!             }
//!             break;
//!         }
//!     }
//!
//!     client.shutdown().await;
//! }
//! ```

pub mod client;
pub mod error;
pub mod event;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use client::{ConnectionState, ScorewallClient, ScorewallConfig};
pub use error::ScorewallError;
pub use event::ScorewallEvent;
pub use protocol::{AttemptRecord, ClientMessage, RegistrationRecord, ServerMessage};
pub use session::{GamePhase, PlayerSummary, SessionState};
pub use transport::{Connector, Transport};

#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
