//! Protocol envelope types.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Wire encoding of protocol envelopes on a connection.
///
/// Negotiated once per connection through the `format` parameter; every
/// envelope on that connection then carries this format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Text JSON encoding.
    Json,
    /// Binary MessagePack encoding.
    MsgPack,
}

impl WireFormat {
    /// Format for a binary-protocol preference flag.
    pub fn for_binary(binary: bool) -> Self {
        if binary { Self::MsgPack } else { Self::Json }
    }

    /// Value emitted as the `format` connection parameter.
    pub fn as_param_value(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::MsgPack => "msgpack",
        }
    }

    /// MIME type for HTTP-based mechanisms.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::MsgPack => "application/x-msgpack",
        }
    }

    /// Whether envelopes in this format travel as binary frames.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::MsgPack)
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param_value())
    }
}

/// The opaque protocol unit a transport moves in either direction.
///
/// Encoding and decoding of the payload is the protocol codec's concern;
/// the transport layer only needs the bytes and their wire format to pick
/// the right frame type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolEnvelope {
    /// The encoded protocol message.
    pub payload: Bytes,

    /// The wire format the payload is encoded in.
    pub format: WireFormat,
}

impl ProtocolEnvelope {
    /// Creates an envelope with an explicit format.
    pub fn new(payload: impl Into<Bytes>, format: WireFormat) -> Self {
        Self {
            payload: payload.into(),
            format,
        }
    }

    /// Creates a JSON-encoded envelope.
    pub fn json(payload: impl Into<Bytes>) -> Self {
        Self::new(payload, WireFormat::Json)
    }

    /// Creates a MessagePack-encoded envelope.
    pub fn msgpack(payload: impl Into<Bytes>) -> Self {
        Self::new(payload, WireFormat::MsgPack)
    }

    /// Size of the encoded payload in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns true when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_for_binary() {
        assert_eq!(WireFormat::for_binary(true), WireFormat::MsgPack);
        assert_eq!(WireFormat::for_binary(false), WireFormat::Json);
    }

    #[test]
    fn test_wire_format_param_values() {
        assert_eq!(WireFormat::Json.as_param_value(), "json");
        assert_eq!(WireFormat::MsgPack.as_param_value(), "msgpack");
        assert_eq!(WireFormat::MsgPack.to_string(), "msgpack");
    }

    #[test]
    fn test_wire_format_frame_type() {
        assert!(WireFormat::MsgPack.is_binary());
        assert!(!WireFormat::Json.is_binary());
    }

    #[test]
    fn test_envelope_construction() {
        let envelope = ProtocolEnvelope::json(&b"{\"action\":15}"[..]);
        assert_eq!(envelope.format, WireFormat::Json);
        assert_eq!(envelope.len(), 13);
        assert!(!envelope.is_empty());
    }
}
