//! Transport abstraction for the Scorewall dashboard protocol.
//!
//! [`Transport`] is a bidirectional channel of whole JSON text messages.
//! Framing is the implementation's problem: WebSocket frames,
//! length-prefixed TCP, QUIC streams, anything that can carry one complete
//! JSON object per message.
//!
//! # Connection Setup
//!
//! Dialing lives in the separate [`Connector`] trait rather than on
//! [`Transport`]: the client owns reconnection, so it must be able to
//! establish fresh connections on its own long after
//! `ScorewallClient::start` returned. A [`Connector`] is the factory the
//! client dials through; each [`Transport`] it yields is used until the
//! connection drops, then discarded.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use scorewall_client::error::ScorewallError;
//! use scorewall_client::transport::{Connector, Transport};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, message: String) -> Result<(), ScorewallError> {
//!         // Write one JSON message to the wire.
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, ScorewallError>> {
//!         // Read the next JSON message; None once the peer hangs up.
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<(), ScorewallError> {
//!         // Wind the connection down.
//!         todo!()
//!     }
//! }
//!
//! struct MyConnector { /* ... */ }
//!
//! #[async_trait]
//! impl Connector for MyConnector {
//!     type Transport = MyTransport;
//!
//!     async fn connect(&mut self, url: &str) -> Result<MyTransport, ScorewallError> {
//!         // Dial `url` and hand back a fresh transport.
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ScorewallError;

/// A bidirectional text message transport for the dashboard protocol.
///
/// Implementors shuttle serialized JSON strings between the client and
/// server, one complete message per [`send`](Transport::send) or
/// [`recv`](Transport::recv) call.
///
/// # Cancel Safety
///
/// [`recv`](Transport::recv) **MUST** be cancel-safe because the client
/// polls it inside `tokio::select!`. A cancelled `recv` must leave the
/// stream intact: calling it again may not skip or lose a message.
/// Channel-backed implementations (wrapping an `mpsc::Receiver`, say) get
/// this for free.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Transmit one complete JSON message.
    ///
    /// # Errors
    ///
    /// Returns [`ScorewallError::TransportSend`] when the message cannot
    /// be written (broken connection, full write buffer).
    async fn send(&mut self, message: String) -> Result<(), ScorewallError>;

    /// Pull the next complete JSON message off the wire.
    ///
    /// Yields `Some(Ok(text))` per message, `Some(Err(_))` on a transport
    /// fault (typically [`ScorewallError::TransportReceive`]), and `None`
    /// once the server has closed the connection cleanly.
    ///
    /// # Cancel Safety
    ///
    /// Must be cancel-safe; see the [trait docs](Transport).
    async fn recv(&mut self) -> Option<Result<String, ScorewallError>>;

    /// Wind the connection down gracefully.
    ///
    /// Afterwards [`send`](Transport::send) and [`recv`](Transport::recv)
    /// may report errors or end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns an error when the close handshake fails; implementations
    /// should release their resources either way.
    async fn close(&mut self) -> Result<(), ScorewallError>;
}

/// Establishes connections for the client's reconnect loop.
///
/// The client calls [`connect`](Connector::connect) for the initial dial
/// and again after every connection loss, with the currently configured
/// endpoint URL. A failed dial is not fatal: the client backs off and
/// calls again.
///
/// Implementations hold whatever long-lived dialing state they need (TLS
/// config, headers, scripted outcomes in tests); the connections they
/// produce are single-use.
#[async_trait]
pub trait Connector: Send + 'static {
    /// The transport type produced by a successful dial.
    type Transport: Transport;

    /// Establish a fresh connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is unreachable, refuses the
    /// connection, or the URL cannot be dialed. The caller treats any
    /// error as a retryable connection failure.
    async fn connect(&mut self, url: &str) -> Result<Self::Transport, ScorewallError>;
}
