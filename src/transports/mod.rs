//! Transport implementations for the Scorewall dashboard protocol.
//!
//! This module provides concrete [`Transport`](crate::Transport) and
//! [`Connector`](crate::Connector) implementations behind feature gates.
//! Enable the corresponding Cargo feature to pull in a transport:
//!
//! | Feature                | Connector              | Transport              |
//! |------------------------|------------------------|------------------------|
//! | `transport-websocket`  | [`WebSocketConnector`] | [`WebSocketTransport`] |
//!
//! # Example
//!
//! ```rust,ignore
//! use scorewall_client::{ScorewallClient, ScorewallConfig, WebSocketConnector};
//!
//! let config = ScorewallConfig::new("ws://localhost:8080/ws");
//! let (client, mut events) = ScorewallClient::start(WebSocketConnector, config);
//! ```

#[cfg(feature = "transport-websocket")]
pub mod websocket;

#[cfg(feature = "transport-websocket")]
pub use websocket::{WebSocketConnector, WebSocketTransport};
