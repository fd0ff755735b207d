//! Availability and delivery notification contracts.

use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::message::ProtocolEnvelope;
use crate::traits::Transport;
use crate::types::TransportKind;

/// Callback contract for the outcome of a connection attempt.
///
/// For every accepted `connect()` call, exactly one of the two callbacks is
/// eventually invoked, exactly once. Callbacks for one transport instance
/// are never invoked concurrently and never after `close()` has completed —
/// with one documented exception: `close()` during a pending connect
/// surfaces [`transport_unavailable`](Self::transport_unavailable) with a
/// [`TransportError::Closed`] reason before the instance finalizes as
/// closed.
pub trait ConnectListener: Send + Sync {
    /// The transport reached the connected state.
    fn transport_available(&self, transport: &dyn Transport);

    /// The transport failed to connect, or an established connection was
    /// lost. Once reported, the instance counts as closed.
    fn transport_unavailable(&self, transport: &dyn Transport, reason: &TransportError);
}

/// The coordinator-side surface a transport delivers into.
///
/// Extends [`ConnectListener`] with the inbound envelope sink that
/// `Transport::receive` routes to. A factory receives one coordinator
/// handle per constructed transport.
pub trait ConnectionCoordinator: ConnectListener + std::fmt::Debug {
    /// An inbound envelope arrived on the connection.
    fn envelope_received(&self, transport: &dyn Transport, envelope: ProtocolEnvelope);
}

/// Notification delivered through a [`ChannelConnectListener`].
#[derive(Debug)]
pub enum ConnectionEvent {
    /// A transport reached the connected state.
    Available {
        /// Mechanism of the transport that connected.
        kind: TransportKind,
        /// Connection URL of the transport.
        url: String,
    },

    /// A transport became unavailable.
    Unavailable {
        /// Mechanism of the transport.
        kind: TransportKind,
        /// Connection URL of the transport.
        url: String,
        /// Why the transport became unavailable.
        reason: TransportError,
    },

    /// An inbound envelope arrived.
    Envelope(ProtocolEnvelope),
}

/// Channel-backed implementation of both notification contracts.
///
/// Forwards every notification into a bounded mpsc channel with a
/// non-blocking `try_send`, dropping events rather than blocking the
/// transport's callback path when the coordinator falls behind.
#[derive(Debug, Clone)]
pub struct ChannelConnectListener {
    sender: mpsc::Sender<ConnectionEvent>,
}

impl ChannelConnectListener {
    /// Creates a listener and the receiver the coordinator drains.
    #[must_use]
    pub fn new() -> (Self, mpsc::Receiver<ConnectionEvent>) {
        let (sender, receiver) = mpsc::channel(256);
        (Self { sender }, receiver)
    }

    fn emit(&self, event: ConnectionEvent) {
        let _ = self.sender.try_send(event);
    }
}

impl ConnectListener for ChannelConnectListener {
    fn transport_available(&self, transport: &dyn Transport) {
        self.emit(ConnectionEvent::Available {
            kind: transport.kind(),
            url: transport.url().to_string(),
        });
    }

    fn transport_unavailable(&self, transport: &dyn Transport, reason: &TransportError) {
        self.emit(ConnectionEvent::Unavailable {
            kind: transport.kind(),
            url: transport.url().to_string(),
            reason: reason.clone(),
        });
    }
}

impl ConnectionCoordinator for ChannelConnectListener {
    fn envelope_received(&self, _transport: &dyn Transport, envelope: ProtocolEnvelope) {
        self.emit(ConnectionEvent::Envelope(envelope));
    }
}
