//! Error types for the Scorewall client.

use thiserror::Error;

/// Errors that can occur when using the Scorewall client.
#[derive(Debug, Error)]
pub enum ScorewallError {
    /// A message could not be written to the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Reading from the transport failed mid-connection.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport was used after it had already been closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// A protocol message could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client has been shut down and can no longer accept commands.
    #[error("client closed")]
    ClientClosed,

    /// Attempted to submit a registration record with no fields set.
    #[error("registration record is empty")]
    EmptyRegistration,

    /// A dial or connect deadline elapsed.
    #[error("operation timed out")]
    Timeout,

    /// An underlying I/O failure, typically from dialing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for Scorewall client operations.
pub type Result<T> = std::result::Result<T, ScorewallError>;
