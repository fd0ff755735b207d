//! Connection-parameter negotiation.
//!
//! Before each connection attempt the coordinator snapshots its
//! configuration and session state into a [`TransportParams`] value;
//! [`TransportParams::connect_params`] then derives the ordered parameter
//! list to attach to the connection URL and the continuity mode the attempt
//! runs under. The derivation is a pure function: identical snapshots yield
//! identical output, and malformed recovery input degrades to a clean start
//! instead of failing.

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::message::WireFormat;
use crate::recovery::RecoveryContext;
use crate::session::SessionState;
use crate::types::ConnectionMode;

/// Name of the protocol-version parameter carried in the base set.
pub const VERSION_PARAM: &str = "v";

/// Protocol version this client speaks.
pub const PROTOCOL_VERSION: &str = "2";

/// Name of the trailing agent-identification parameter.
pub const AGENT_PARAM: &str = "agent";

/// A single name/value connection parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter value, un-encoded.
    pub value: String,
}

impl Param {
    /// Creates a parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The standard base parameter set: just the protocol version marker.
pub fn base_params() -> Vec<Param> {
    vec![Param::new(VERSION_PARAM, PROTOCOL_VERSION)]
}

/// Serializes `params` as URL-encoded `name=value` pairs joined by `&`,
/// preserving order.
pub fn to_query_string(params: &[Param]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for param in params {
        serializer.append_pair(&param.name, &param.value);
    }
    serializer.finish()
}

/// Outcome of parameter negotiation for one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedParams {
    /// The ordered parameter list.
    pub params: Vec<Param>,
    /// The continuity mode the attempt runs under.
    pub mode: ConnectionMode,
}

/// Immutable per-attempt snapshot handed to a transport factory.
#[derive(Debug, Clone)]
pub struct TransportParams {
    /// Host to connect to.
    pub host: String,
    /// Port to connect to.
    pub port: u16,
    /// Whether to use a TLS-wrapped connection.
    pub use_tls: bool,
    /// Client configuration snapshot.
    pub config: ClientConfig,
    /// Session-continuity snapshot.
    pub session: SessionState,
    /// Pre-formatted agent identification string (an external collaborator
    /// folds the configured agent entries and the platform into this).
    pub agent: String,
}

impl TransportParams {
    /// Creates a snapshot for a clean session against `host:port`.
    pub fn new(host: impl Into<String>, port: u16, use_tls: bool, config: ClientConfig) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls,
            config,
            session: SessionState::new(),
            agent: String::new(),
        }
    }

    /// Replaces the session snapshot.
    #[must_use]
    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }

    /// Sets the agent identification string.
    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    /// The host this snapshot targets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port this snapshot targets.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The wire format negotiated by this snapshot.
    pub fn wire_format(&self) -> WireFormat {
        WireFormat::for_binary(self.config.use_binary_protocol)
    }

    /// Derives the connection parameters and continuity mode for one
    /// attempt.
    ///
    /// Emission order: base params, `format`, `echo` (only when disabled),
    /// the mode-specific params, `clientId`, `heartbeats` (only when not
    /// required), configured extra params verbatim, and the agent string
    /// last. Mode selection is mutually exclusive: a held connection key
    /// always resumes; otherwise a decodable recovery token recovers; a
    /// token that fails to decode is ignored and the attempt stays clean.
    pub fn connect_params(&self, base: &[Param]) -> NegotiatedParams {
        let mut params: Vec<Param> = base.to_vec();
        let mut mode = ConnectionMode::Clean;

        params.push(Param::new("format", self.wire_format().as_param_value()));

        if !self.config.echo_messages {
            params.push(Param::new("echo", "false"));
        }

        if let Some(key) = &self.session.connection_key {
            mode = ConnectionMode::Resume;
            params.push(Param::new("resume", key.as_str()));
            if let Some(serial) = self.session.connection_serial {
                params.push(Param::new("connectionSerial", serial.to_string()));
            }
        } else if let Some(raw) = self.config.recovery_string() {
            if let Some(context) = RecoveryContext::decode(raw) {
                mode = ConnectionMode::Recover;
                params.push(Param::new("recover", context.connection_key));
            }
        }

        if let Some(client_id) = &self.config.client_id {
            params.push(Param::new("clientId", client_id.as_str()));
        }

        if !self.session.heartbeats {
            params.push(Param::new("heartbeats", "false"));
        }

        params.extend(self.config.transport_params.iter().cloned());

        params.push(Param::new(AGENT_PARAM, self.agent.as_str()));

        NegotiatedParams { params, mode }
    }
}
