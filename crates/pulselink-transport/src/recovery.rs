//! Recovery token decoding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Decoded form of the opaque recovery string: the session handle a client
/// persists so a later process can recover the session after the connection
/// key is no longer held in memory.
///
/// The wire form is a JSON object with camelCase keys. Decoding is strictly
/// best-effort: any malformed input yields `None` and the caller degrades to
/// a clean start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryContext {
    /// Key of the connection the session belonged to.
    pub connection_key: String,

    /// Serial of the last message published by this client, for outbound
    /// continuity.
    #[serde(default)]
    pub msg_serial: i64,

    /// Per-channel attach serials, for inbound continuity.
    #[serde(default)]
    pub channel_serials: HashMap<String, String>,
}

impl RecoveryContext {
    /// Creates a context for `connection_key` with no continuity markers.
    pub fn new(connection_key: impl Into<String>) -> Self {
        Self {
            connection_key: connection_key.into(),
            msg_serial: 0,
            channel_serials: HashMap::new(),
        }
    }

    /// Decodes a persisted recovery string.
    ///
    /// Returns `None` for empty input, non-JSON input, or a token without a
    /// usable connection key. This is an expected outcome, not an error.
    pub fn decode(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<Self>(raw) {
            Ok(context) if !context.connection_key.is_empty() => Some(context),
            Ok(_) => {
                debug!("recovery token carries no connection key, ignoring");
                None
            }
            Err(err) => {
                debug!(error = %err, "malformed recovery token, ignoring");
                None
            }
        }
    }

    /// Encodes this context into the persistable recovery string.
    pub fn encode(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}
