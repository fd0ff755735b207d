//! WebSocket transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mechanism-level knobs for the WebSocket transport.
///
/// Connection-level options (timeout, encoding, continuity) travel in the
/// [`TransportParams`](pulselink_transport::TransportParams) snapshot; this
/// covers only what is specific to the WebSocket wire mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// Interval between client keep-alive pings. Pings are only sent while
    /// the session requires heartbeats.
    #[serde(with = "duration_millis")]
    pub keep_alive_interval: Duration,

    /// Disable Nagle's algorithm on the underlying TCP stream.
    pub tcp_nodelay: bool,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            keep_alive_interval: Duration::from_secs(15),
            tcp_nodelay: true,
        }
    }
}

impl WebSocketConfig {
    /// Sets the keep-alive ping interval.
    #[must_use]
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Sets whether Nagle's algorithm is disabled.
    #[must_use]
    pub fn with_tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.tcp_nodelay = nodelay;
        self
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
