//! Client configuration consumed by the negotiation layer.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::params::Param;

/// Client options relevant to transport negotiation.
///
/// Owned by the caller and read-only to this layer; a snapshot is taken per
/// connection attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefer the binary (msgpack) wire encoding over JSON.
    pub use_binary_protocol: bool,

    /// Whether messages published on a connection are echoed back to it.
    /// The wire default is true; the `echo` parameter is only emitted to
    /// turn echoing off.
    pub echo_messages: bool,

    /// Client identity to assert on the connection, if any.
    pub client_id: Option<String>,

    /// Opaque recovery string persisted from a previous session. Empty is
    /// treated identically to absent.
    pub recover: Option<String>,

    /// Extra connection parameters appended verbatim, after all derived
    /// parameters and in the given order.
    pub transport_params: Vec<Param>,

    /// Agent entries (name → optional version) folded into the agent
    /// identification string by the caller's agent formatter.
    pub agents: BTreeMap<String, Option<String>>,

    /// Deadline for a single connection attempt.
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            use_binary_protocol: false,
            echo_messages: true,
            client_id: None,
            recover: None,
            transport_params: Vec::new(),
            agents: BTreeMap::new(),
            connect_timeout: Duration::from_secs(15),
        }
    }
}

impl ClientConfig {
    /// Sets the binary-protocol preference.
    #[must_use]
    pub fn with_binary_protocol(mut self, binary: bool) -> Self {
        self.use_binary_protocol = binary;
        self
    }

    /// Disables echoing of published messages back to this connection.
    #[must_use]
    pub fn without_echo(mut self) -> Self {
        self.echo_messages = false;
        self
    }

    /// Sets the client identity.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the recovery string from a persisted token.
    #[must_use]
    pub fn with_recover(mut self, recover: impl Into<String>) -> Self {
        self.recover = Some(recover.into());
        self
    }

    /// Appends an extra connection parameter.
    #[must_use]
    pub fn with_transport_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.transport_params.push(Param::new(name, value));
        self
    }

    /// Registers an agent entry.
    #[must_use]
    pub fn with_agent(mut self, name: impl Into<String>, version: Option<String>) -> Self {
        self.agents.insert(name.into(), version);
        self
    }

    /// Returns the recovery string when it is present and non-empty.
    pub fn recovery_string(&self) -> Option<&str> {
        self.recover.as_deref().filter(|r| !r.is_empty())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert!(!config.use_binary_protocol);
        assert!(config.echo_messages);
        assert!(config.client_id.is_none());
        assert!(config.recover.is_none());
        assert!(config.transport_params.is_empty());
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::default()
            .with_binary_protocol(true)
            .without_echo()
            .with_client_id("client-1")
            .with_transport_param("remainPresentFor", "30000")
            .with_agent("pulselink-rust", Some("0.1.0".to_string()));

        assert!(config.use_binary_protocol);
        assert!(!config.echo_messages);
        assert_eq!(config.client_id.as_deref(), Some("client-1"));
        assert_eq!(config.transport_params.len(), 1);
        assert_eq!(
            config.agents.get("pulselink-rust"),
            Some(&Some("0.1.0".to_string()))
        );
    }

    #[test]
    fn test_empty_recovery_string_is_absent() {
        let config = ClientConfig::default().with_recover("");
        assert!(config.recovery_string().is_none());

        let config = ClientConfig::default().with_recover("{\"connectionKey\":\"k\"}");
        assert!(config.recovery_string().is_some());
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let config = ClientConfig::default().with_client_id("c").with_binary_protocol(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.client_id.as_deref(), Some("c"));
        assert!(back.use_binary_protocol);
        assert_eq!(back.connect_timeout, config.connect_timeout);
    }
}
