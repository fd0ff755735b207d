//! WebSocket transport factory.

use std::sync::Arc;

use pulselink_transport::{
    ConnectionCoordinator, Transport, TransportFactory, TransportKind, TransportParams,
    TransportResult,
};

use crate::config::WebSocketConfig;
use crate::transport::WebSocketTransport;

/// Factory producing [`WebSocketTransport`] instances.
///
/// The coordinator registers one factory per mechanism and asks the chosen
/// one for a fresh transport before each connection attempt.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransportFactory {
    config: WebSocketConfig,
}

impl WebSocketTransportFactory {
    /// Creates a factory with default mechanism configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with the given mechanism configuration.
    pub fn with_config(config: WebSocketConfig) -> Self {
        Self { config }
    }
}

impl TransportFactory for WebSocketTransportFactory {
    fn kind(&self) -> TransportKind {
        TransportKind::WebSocket
    }

    fn transport(
        &self,
        params: TransportParams,
        coordinator: Arc<dyn ConnectionCoordinator>,
    ) -> TransportResult<Box<dyn Transport>> {
        let transport = WebSocketTransport::new(params, self.config.clone(), coordinator)?;
        Ok(Box::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulselink_transport::{ChannelConnectListener, ClientConfig, TransportState};

    fn params() -> TransportParams {
        TransportParams::new("127.0.0.1", 8080, false, ClientConfig::default())
            .with_agent("pulselink-rust/0.1.0")
    }

    #[tokio::test]
    async fn test_factory_produces_idle_instances() {
        let factory = WebSocketTransportFactory::new();
        let (coordinator, _events) = ChannelConnectListener::new();

        let transport = factory
            .transport(params(), Arc::new(coordinator))
            .unwrap();
        assert_eq!(transport.kind(), TransportKind::WebSocket);
        assert_eq!(transport.state().await, TransportState::Idle);
        assert!(factory.is_available());
    }

    #[tokio::test]
    async fn test_factory_produces_independent_instances() {
        let factory = WebSocketTransportFactory::new();
        let (coordinator, _events) = ChannelConnectListener::new();
        let coordinator: Arc<dyn ConnectionCoordinator> = Arc::new(coordinator);

        let first = factory
            .transport(params(), coordinator.clone())
            .unwrap();
        let second = factory
            .transport(params(), coordinator)
            .unwrap();

        first.close().await;
        assert_eq!(first.state().await, TransportState::Closed);
        assert_eq!(second.state().await, TransportState::Idle);
    }

    #[test]
    fn test_factory_rejects_unparseable_hosts() {
        let factory = WebSocketTransportFactory::new();
        let (coordinator, _events) = ChannelConnectListener::new();
        let params = TransportParams::new("not a host", 8080, false, ClientConfig::default());

        let result = factory.transport(params, Arc::new(coordinator));
        assert!(result.is_err());
    }
}
