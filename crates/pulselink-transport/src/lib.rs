//! # Pulselink Transport
//!
//! Transport abstraction and connection-parameter negotiation for the
//! Pulselink realtime publish/subscribe client. This crate provides the
//! foundational contracts that all transport mechanisms depend on.
//!
//! ## Overview
//!
//! This crate defines:
//! - **Traits**: [`Transport`], [`TransportFactory`], [`ConnectListener`],
//!   [`ConnectionCoordinator`]
//! - **Negotiation**: [`TransportParams`], [`NegotiatedParams`], [`Param`],
//!   [`RecoveryContext`]
//! - **Types**: [`TransportKind`], [`TransportState`], [`ConnectionMode`],
//!   [`ProtocolEnvelope`], [`WireFormat`]
//! - **Errors**: [`TransportError`], [`TransportResult`]
//! - **Metrics**: [`TransportMetrics`], [`AtomicMetrics`]
//!
//! ## Usage
//!
//! Before each connection attempt the coordinator snapshots configuration
//! and session state, negotiates the connection parameters, and hands the
//! snapshot to a factory:
//!
//! ```rust
//! use pulselink_transport::{
//!     base_params, ClientConfig, ConnectionMode, SessionState, TransportParams,
//! };
//!
//! let params = TransportParams::new("realtime.example.com", 443, true, ClientConfig::default())
//!     .with_session(SessionState::resuming("key-1", Some(42)))
//!     .with_agent("pulselink-rust/0.1.0");
//!
//! let negotiated = params.connect_params(&base_params());
//! assert_eq!(negotiated.mode, ConnectionMode::Resume);
//! ```
//!
//! Transport mechanisms depend on this crate and implement the
//! [`Transport`] and [`TransportFactory`] traits.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

mod config;
mod error;
mod listener;
mod message;
mod metrics;
mod params;
mod recovery;
mod session;
mod traits;
mod types;

pub use config::ClientConfig;
pub use error::{TransportError, TransportResult};
pub use listener::{
    ChannelConnectListener, ConnectListener, ConnectionCoordinator, ConnectionEvent,
};
pub use message::{ProtocolEnvelope, WireFormat};
pub use metrics::{AtomicMetrics, TransportMetrics};
pub use params::{
    AGENT_PARAM, NegotiatedParams, PROTOCOL_VERSION, Param, TransportParams, VERSION_PARAM,
    base_params, to_query_string,
};
pub use recovery::RecoveryContext;
pub use session::SessionState;
pub use traits::{Transport, TransportFactory};
pub use types::{ConnectionMode, TransportKind, TransportState};
