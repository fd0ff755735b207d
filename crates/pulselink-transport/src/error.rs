//! Transport error types.

use thiserror::Error;

use crate::types::TransportState;

/// A specialized `Result` type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Represents errors that can occur during transport operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum TransportError {
    /// Failed to establish a connection. Reported asynchronously through the
    /// connect listener, never returned from `connect()` itself.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// An established connection was lost.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// An operation was invoked in a state that does not permit it.
    #[error("Invalid state for {operation}: transport is {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: String,
        /// The state the transport was in at the time.
        state: TransportState,
    },

    /// The transport has been closed; no further operations are possible.
    #[error("Transport closed")]
    Closed,

    /// Failed to write a message to the underlying connection.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The connection attempt did not complete within the configured deadline.
    #[error("Connect attempt timed out")]
    Timeout,

    /// Failed to serialize or deserialize transport-level data.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// The requested transport mechanism is not available.
    #[error("Transport not available: {0}")]
    NotAvailable(String),

    /// An underlying I/O error occurred.
    #[error("IO error: {0}")]
    Io(String),
}

impl TransportError {
    /// Builds an [`InvalidState`](Self::InvalidState) error for `operation`
    /// attempted while the transport was in `state`.
    pub fn invalid_state(operation: impl Into<String>, state: TransportState) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            state,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationFailed(err.to_string())
    }
}
