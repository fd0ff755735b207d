//! Transient session-continuity state.

use serde::{Deserialize, Serialize};

/// Session state the connection coordinator carries across reconnect
/// attempts.
///
/// The continuity mode is deliberately not stored here: it is computed from
/// this snapshot (and the configured recovery string) on every attempt by
/// [`TransportParams::connect_params`](crate::params::TransportParams::connect_params).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Connection key issued by the server once a connection was accepted.
    /// Its presence makes the next attempt a resume.
    pub connection_key: Option<String>,

    /// Last-acknowledged position within the session. Only meaningful while
    /// a connection key is held.
    pub connection_serial: Option<i64>,

    /// Whether the server is asked to emit heartbeats on this attempt.
    /// The wire default is true; the `heartbeats` parameter is only emitted
    /// to turn them off.
    #[serde(default = "default_heartbeats")]
    pub heartbeats: bool,
}

fn default_heartbeats() -> bool {
    true
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A clean-start state: no key, no serial, heartbeats required.
    pub fn new() -> Self {
        Self {
            connection_key: None,
            connection_serial: None,
            heartbeats: true,
        }
    }

    /// State for resuming with `key`, optionally from `serial`.
    pub fn resuming(key: impl Into<String>, serial: Option<i64>) -> Self {
        Self {
            connection_key: Some(key.into()),
            connection_serial: serial,
            heartbeats: true,
        }
    }

    /// Returns true when a connection key is held.
    pub fn has_connection_key(&self) -> bool {
        self.connection_key.is_some()
    }

    /// Discards resume state, reverting the next attempt to clean (or
    /// recover, when a recovery string is configured).
    pub fn reset(&mut self) {
        self.connection_key = None;
        self.connection_serial = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_requires_heartbeats() {
        let state = SessionState::new();
        assert!(state.heartbeats);
        assert!(!state.has_connection_key());
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn test_resuming_state() {
        let state = SessionState::resuming("abc123", Some(42));
        assert_eq!(state.connection_key.as_deref(), Some("abc123"));
        assert_eq!(state.connection_serial, Some(42));
    }

    #[test]
    fn test_reset_drops_resume_state() {
        let mut state = SessionState::resuming("abc123", Some(42));
        state.reset();
        assert!(!state.has_connection_key());
        assert!(state.connection_serial.is_none());
    }

    #[test]
    fn test_heartbeats_defaults_true_when_missing_in_json() {
        let state: SessionState = serde_json::from_str("{}").unwrap();
        assert!(state.heartbeats);
    }
}
