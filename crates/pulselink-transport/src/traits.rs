//! Core transport traits.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::TransportResult;
use crate::listener::{ConnectListener, ConnectionCoordinator};
use crate::message::ProtocolEnvelope;
use crate::metrics::TransportMetrics;
use crate::params::TransportParams;
use crate::types::{TransportKind, TransportState};

/// The uniform lifecycle surface every wire mechanism implements.
///
/// An instance owns exactly one underlying connection and moves through
/// `Idle → Connecting → Connected → Closed`; it is never reused after
/// close. Establishment failure is reported through the
/// [`ConnectListener`], after which the instance counts as closed.
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Returns the mechanism of this transport.
    fn kind(&self) -> TransportKind;

    /// Returns the current lifecycle state.
    fn state(&self) -> Pin<Box<dyn Future<Output = TransportState> + Send + '_>>;

    /// Begins establishing the underlying connection asynchronously.
    ///
    /// Returns `Err(InvalidState)` synchronously when the instance is not
    /// idle (`Closed` after close). For every `Ok(())`, exactly one of the
    /// listener's two callbacks is eventually invoked, exactly once;
    /// establishment failure is never returned from this method.
    fn connect(
        &self,
        listener: Arc<dyn ConnectListener>,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Writes a protocol envelope to the connection.
    ///
    /// Fails with `InvalidState`/`Closed` outside the connected state and
    /// with an I/O-kind error when the underlying write fails. Retry is the
    /// coordinator's concern, not this layer's.
    fn send(
        &self,
        envelope: ProtocolEnvelope,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Delivers an inbound envelope to the owning coordinator.
    ///
    /// Invoked by the mechanism's read path; whether that path pulls or is
    /// pushed to depends on the mechanism. Fails with `Closed` after close.
    fn receive(
        &self,
        envelope: ProtocolEnvelope,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Closes the transport, releasing the underlying connection.
    ///
    /// Idempotent, and valid in any state. A close racing a pending
    /// connect surfaces `transport_unavailable` with a `Closed` reason
    /// exactly once before the instance finalizes.
    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// The effective host this instance targets. Stable for the lifetime
    /// of the instance.
    fn host(&self) -> &str;

    /// The full connection URL, query parameters included. Stable for the
    /// lifetime of the instance.
    fn url(&self) -> &str;

    /// Returns a snapshot of the transport's traffic counters.
    fn metrics(&self) -> Pin<Box<dyn Future<Output = TransportMetrics> + Send + '_>>;

    /// Returns `true` if the transport is currently in the `Connected`
    /// state.
    fn is_connected(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move { matches!(self.state().await, TransportState::Connected) })
    }
}

/// A factory for creating instances of a specific transport mechanism.
///
/// The one extension point for adding wire mechanisms: the coordinator
/// selects a factory, never a concrete type.
pub trait TransportFactory: Send + Sync + std::fmt::Debug {
    /// Returns the mechanism this factory creates.
    fn kind(&self) -> TransportKind;

    /// Creates a fresh, idle transport for one connection attempt.
    ///
    /// Pure construction: performs no I/O and never blocks. Each call
    /// yields an independent instance; no pooling happens at this layer.
    fn transport(
        &self,
        params: TransportParams,
        coordinator: Arc<dyn ConnectionCoordinator>,
    ) -> TransportResult<Box<dyn Transport>>;

    /// Returns `true` if this mechanism is usable on the current system.
    fn is_available(&self) -> bool {
        true
    }
}
