//! # Pulselink WebSocket Transport
//!
//! WebSocket transport mechanism for the Pulselink realtime client,
//! implementing the [`Transport`] contract from `pulselink-transport` over
//! `tokio-tungstenite`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pulselink_transport::{
//!     ChannelConnectListener, ClientConfig, Transport, TransportFactory, TransportParams,
//! };
//! use pulselink_websocket::WebSocketTransportFactory;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (coordinator, mut events) = ChannelConnectListener::new();
//! let factory = WebSocketTransportFactory::new();
//!
//! let params = TransportParams::new("realtime.example.com", 443, true, ClientConfig::default())
//!     .with_agent("pulselink-rust/0.1.0");
//! let transport = factory.transport(params, Arc::new(coordinator.clone()))?;
//!
//! transport.connect(Arc::new(coordinator)).await?;
//! // ... drain `events` for the availability outcome and inbound envelopes
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! pulselink-websocket/
//! ├── config.rs    # Mechanism-level configuration
//! ├── transport.rs # Transport contract implementation + background tasks
//! └── factory.rs   # TransportFactory implementation
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

mod config;
mod factory;
mod transport;

pub use config::WebSocketConfig;
pub use factory::WebSocketTransportFactory;
pub use transport::WebSocketTransport;

// Re-export the foundation contracts for convenience
pub use pulselink_transport::{
    ChannelConnectListener, ConnectListener, ConnectionCoordinator, ConnectionEvent,
    ConnectionMode, ProtocolEnvelope, Transport, TransportError, TransportFactory,
    TransportKind, TransportMetrics, TransportParams, TransportResult, TransportState,
    WireFormat,
};
