//! Core transport types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Enumerates the transport mechanisms supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// WebSocket for full-duplex communication.
    WebSocket,
    /// HTTP long-polling fallback (comet-style).
    LongPoll,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebSocket => write!(f, "websocket"),
            Self::LongPoll => write!(f, "longpoll"),
        }
    }
}

/// Represents the current state of a transport instance.
///
/// The lifecycle is `Idle → Connecting → Connected → Closed`. Establishment
/// failure is not a distinct state: it is reported through the connect
/// listener and the instance then counts as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    /// Freshly constructed; no connection attempt has been made.
    Idle,
    /// A connection attempt is in progress.
    Connecting,
    /// The transport is connected and ready to send/receive messages.
    Connected,
    /// The transport has been closed and must not be reused.
    Closed,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// How a new connection attempt relates to prior session state.
///
/// Exactly one mode applies per attempt, selected by data presence: a held
/// connection key forces [`Resume`](Self::Resume), otherwise a decodable
/// recovery string selects [`Recover`](Self::Recover), otherwise the attempt
/// is a [`Clean`](Self::Clean) start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// No prior session state carries over.
    Clean,
    /// Reattach to a still-live server-side session using a held key.
    Resume,
    /// Reestablish a session from a persisted recovery token.
    Recover,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Resume => write!(f, "resume"),
            Self::Recover => write!(f, "recover"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_display() {
        assert_eq!(TransportKind::WebSocket.to_string(), "websocket");
        assert_eq!(TransportKind::LongPoll.to_string(), "longpoll");
    }

    #[test]
    fn test_transport_state_display() {
        assert_eq!(TransportState::Idle.to_string(), "idle");
        assert_eq!(TransportState::Connecting.to_string(), "connecting");
        assert_eq!(TransportState::Connected.to_string(), "connected");
        assert_eq!(TransportState::Closed.to_string(), "closed");
    }

    #[test]
    fn test_connection_mode_display() {
        assert_eq!(ConnectionMode::Clean.to_string(), "clean");
        assert_eq!(ConnectionMode::Resume.to_string(), "resume");
        assert_eq!(ConnectionMode::Recover.to_string(), "recover");
    }

    #[test]
    fn test_connection_mode_serde() {
        let json = serde_json::to_string(&ConnectionMode::Recover).unwrap();
        assert_eq!(json, "\"recover\"");
    }
}
