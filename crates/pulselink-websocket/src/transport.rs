//! WebSocket transport implementation.
//!
//! One instance drives one `tokio-tungstenite` connection through the
//! `Idle → Connecting → Connected → Closed` lifecycle. A single background
//! reader task owns the read half of the stream and routes inbound frames
//! through [`Transport::receive`] to the owning coordinator; an optional
//! keep-alive task sends periodic pings while the session requires
//! heartbeats. All background tasks select on a broadcast shutdown channel
//! so `close()` terminates them promptly.
//!
//! Cancellation contract: `close()` while a connect attempt is outstanding
//! reports `transport_unavailable` with a [`TransportError::Closed`] reason
//! exactly once before the instance finalizes as closed. The coordinator
//! therefore observes exactly one terminal callback per accepted
//! `connect()` call.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU8, Ordering};

use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt as _, StreamExt as _};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async_with_config, tungstenite::Message,
};
use tracing::{debug, trace, warn};
use url::Url;

use pulselink_transport::{
    AtomicMetrics, ConnectListener, ConnectionCoordinator, ConnectionMode, NegotiatedParams,
    ProtocolEnvelope, Transport, TransportError, TransportKind, TransportMetrics, TransportParams,
    TransportResult, TransportState, base_params, to_query_string,
};

use crate::config::WebSocketConfig;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Terminal-callback bookkeeping: nothing delivered yet.
const OUTCOME_PENDING: u8 = 0;
/// `transport_available` has been delivered.
const OUTCOME_AVAILABLE: u8 = 1;
/// `transport_unavailable` has been delivered; no further callbacks.
const OUTCOME_UNAVAILABLE: u8 = 2;

struct Inner {
    params: TransportParams,
    config: WebSocketConfig,
    negotiated: NegotiatedParams,
    url: String,
    coordinator: Arc<dyn ConnectionCoordinator>,
    state: RwLock<TransportState>,
    writer: Mutex<Option<WsSink>>,
    listener: StdMutex<Option<Arc<dyn ConnectListener>>>,
    outcome: AtomicU8,
    shutdown_tx: broadcast::Sender<()>,
    task_handles: StdMutex<Vec<JoinHandle<()>>>,
    metrics: AtomicMetrics,
    session_id: String,
}

/// WebSocket transport instance.
///
/// Cheap to clone; clones share the underlying connection. The factory
/// hands out a single boxed handle, internal tasks hold clones.
#[derive(Clone)]
pub struct WebSocketTransport {
    inner: Arc<Inner>,
}

impl fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("url", &self.inner.url)
            .field("mode", &self.inner.negotiated.mode)
            .field("session_id", &self.inner.session_id)
            .finish_non_exhaustive()
    }
}

impl WebSocketTransport {
    /// Builds an idle transport for one connection attempt.
    ///
    /// Negotiates the connection parameters from `params` and assembles the
    /// full connection URL; performs no I/O.
    pub(crate) fn new(
        params: TransportParams,
        config: WebSocketConfig,
        coordinator: Arc<dyn ConnectionCoordinator>,
    ) -> TransportResult<Self> {
        let negotiated = params.connect_params(&base_params());
        let scheme = if params.use_tls { "wss" } else { "ws" };
        let mut url = Url::parse(&format!("{}://{}:{}/", scheme, params.host, params.port))
            .map_err(|err| {
                TransportError::NotAvailable(format!("invalid connection URL: {err}"))
            })?;
        url.set_query(Some(&to_query_string(&negotiated.params)));

        let (shutdown_tx, _) = broadcast::channel(4);
        Ok(Self {
            inner: Arc::new(Inner {
                params,
                config,
                negotiated,
                url: url.into(),
                coordinator,
                state: RwLock::new(TransportState::Idle),
                writer: Mutex::new(None),
                listener: StdMutex::new(None),
                outcome: AtomicU8::new(OUTCOME_PENDING),
                shutdown_tx,
                task_handles: StdMutex::new(Vec::new()),
                metrics: AtomicMetrics::new(),
                session_id: uuid::Uuid::new_v4().to_string(),
            }),
        })
    }

    /// The continuity mode negotiated for this attempt.
    pub fn mode(&self) -> ConnectionMode {
        self.inner.negotiated.mode
    }

    /// Session identifier used in log events.
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    fn spawn_task(&self, handle: JoinHandle<()>) {
        self.inner
            .task_handles
            .lock()
            .expect("task handle mutex poisoned")
            .push(handle);
    }

    fn current_listener(&self) -> Option<Arc<dyn ConnectListener>> {
        self.inner
            .listener
            .lock()
            .expect("listener mutex poisoned")
            .clone()
    }

    fn deliver_available(&self) {
        let won = self
            .inner
            .outcome
            .compare_exchange(
                OUTCOME_PENDING,
                OUTCOME_AVAILABLE,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won && let Some(listener) = self.current_listener() {
            listener.transport_available(self);
        }
    }

    fn deliver_unavailable(&self, reason: &TransportError) {
        let won = self
            .inner
            .outcome
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |outcome| {
                (outcome != OUTCOME_UNAVAILABLE).then_some(OUTCOME_UNAVAILABLE)
            })
            .is_ok();
        if won && let Some(listener) = self.current_listener() {
            listener.transport_unavailable(self, reason);
        }
    }

    /// Unavailability report that yields to an already-delivered outcome.
    ///
    /// Used by `close()`: a user-initiated close must cancel a pending
    /// connect with exactly one report, but must stay silent once the
    /// attempt already resolved either way.
    fn deliver_unavailable_if_pending(&self, reason: &TransportError) {
        let won = self
            .inner
            .outcome
            .compare_exchange(
                OUTCOME_PENDING,
                OUTCOME_UNAVAILABLE,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won && let Some(listener) = self.current_listener() {
            listener.transport_unavailable(self, reason);
        }
    }

    /// Drives one connection attempt to its terminal outcome.
    async fn establish(self) {
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let timeout = self.inner.params.config.connect_timeout;
        let url = self.inner.url.clone();
        let nodelay = self.inner.config.tcp_nodelay;

        let attempt = async {
            match tokio::time::timeout(
                timeout,
                connect_async_with_config(url.as_str(), None, nodelay),
            )
            .await
            {
                Err(_) => Err(TransportError::Timeout),
                Ok(Err(err)) => Err(TransportError::ConnectionFailed(err.to_string())),
                Ok(Ok((stream, _response))) => Ok(stream),
            }
        };

        let result = tokio::select! {
            _ = shutdown_rx.recv() => Err(TransportError::Closed),
            result = attempt => result,
        };

        match result {
            Ok(stream) => {
                let (sink, read_half) = stream.split();
                {
                    let mut state = self.inner.state.write().await;
                    if *state != TransportState::Connecting {
                        // close() won the race and already reported the
                        // outcome; drop the fresh connection on the floor.
                        return;
                    }
                    *self.inner.writer.lock().await = Some(sink);
                    *state = TransportState::Connected;
                }
                debug!(
                    session_id = %self.inner.session_id,
                    url = %self.inner.url,
                    mode = %self.inner.negotiated.mode,
                    "websocket connected"
                );
                // Report availability before the reader starts, so a server
                // that closes immediately cannot report loss first.
                self.deliver_available();
                self.spawn_task(tokio::spawn(self.clone().read_loop(read_half)));
                if self.inner.params.session.heartbeats {
                    self.spawn_task(tokio::spawn(self.clone().keep_alive_loop()));
                }
            }
            Err(reason) => {
                self.inner.metrics.record_connect_failure();
                {
                    let mut state = self.inner.state.write().await;
                    if *state == TransportState::Connecting {
                        *state = TransportState::Closed;
                    }
                }
                if matches!(reason, TransportError::Closed) {
                    // Shutdown signal during the attempt: close() reported.
                    return;
                }
                warn!(
                    session_id = %self.inner.session_id,
                    error = %reason,
                    "websocket connect failed"
                );
                self.deliver_unavailable(&reason);
            }
        }
    }

    /// Single consumer of the stream's read half: routes data frames into
    /// `receive()`, answers pings, and detects connection loss.
    async fn read_loop(self, mut read_half: WsStream) {
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let format = self.inner.params.wire_format();

        let loss: Option<TransportError> = loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break None,
                frame = read_half.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let payload = Bytes::from(text.as_bytes().to_vec());
                        if let Err(err) = self.receive(ProtocolEnvelope::json(payload)).await {
                            warn!(
                                session_id = %self.inner.session_id,
                                error = %err,
                                "dropping inbound text frame"
                            );
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        let envelope = ProtocolEnvelope::new(data, format);
                        if let Err(err) = self.receive(envelope).await {
                            warn!(
                                session_id = %self.inner.session_id,
                                error = %err,
                                "dropping inbound binary frame"
                            );
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if let Some(sink) = &mut *self.inner.writer.lock().await
                            && sink.send(Message::Pong(payload)).await.is_ok()
                        {
                            trace!(session_id = %self.inner.session_id, "sent pong");
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        trace!(session_id = %self.inner.session_id, "received pong");
                    }
                    Some(Ok(Message::Close(_))) => {
                        break Some(TransportError::ConnectionLost(
                            "server closed the connection".to_string(),
                        ));
                    }
                    Some(Ok(_)) => {
                        trace!(session_id = %self.inner.session_id, "ignoring raw frame");
                    }
                    Some(Err(err)) => {
                        break Some(TransportError::ConnectionLost(err.to_string()));
                    }
                    None => {
                        break Some(TransportError::ConnectionLost(
                            "stream ended".to_string(),
                        ));
                    }
                }
            }
        };

        if let Some(reason) = loss {
            let was_connected = {
                let mut state = self.inner.state.write().await;
                if *state == TransportState::Connected {
                    *state = TransportState::Closed;
                    true
                } else {
                    false
                }
            };
            if was_connected {
                warn!(
                    session_id = %self.inner.session_id,
                    error = %reason,
                    "websocket connection lost"
                );
                let _ = self.inner.shutdown_tx.send(());
                if let Some(mut sink) = self.inner.writer.lock().await.take() {
                    let _ = sink.close().await;
                }
                self.deliver_unavailable(&reason);
            }
        }
        debug!(session_id = %self.inner.session_id, "reader task terminated");
    }

    /// Periodic client pings while the session requires heartbeats.
    async fn keep_alive_loop(self) {
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let mut ticker = tokio::time::interval(self.inner.config.keep_alive_interval);
        let mut ping_count = 0u64;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {
                    if *self.inner.state.read().await != TransportState::Connected {
                        continue;
                    }
                    if let Some(sink) = &mut *self.inner.writer.lock().await {
                        ping_count += 1;
                        let payload = format!("ping-{}-{}", self.inner.session_id, ping_count);
                        if let Err(err) = sink.send(Message::Ping(Bytes::from(payload.into_bytes()))).await {
                            warn!(
                                session_id = %self.inner.session_id,
                                error = %err,
                                "keep-alive ping failed"
                            );
                        }
                    }
                }
            }
        }
        debug!(session_id = %self.inner.session_id, "keep-alive task terminated");
    }
}

impl Transport for WebSocketTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::WebSocket
    }

    fn state(&self) -> Pin<Box<dyn Future<Output = TransportState> + Send + '_>> {
        Box::pin(async move { *self.inner.state.read().await })
    }

    fn connect(
        &self,
        listener: Arc<dyn ConnectListener>,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let this = self.clone();
        Box::pin(async move {
            {
                let mut state = this.inner.state.write().await;
                match *state {
                    TransportState::Idle => *state = TransportState::Connecting,
                    TransportState::Closed => return Err(TransportError::Closed),
                    other => return Err(TransportError::invalid_state("connect", other)),
                }
            }
            *this
                .inner
                .listener
                .lock()
                .expect("listener mutex poisoned") = Some(listener);
            this.inner.metrics.record_connect_attempt();
            debug!(
                session_id = %this.inner.session_id,
                url = %this.inner.url,
                "websocket connect attempt started"
            );
            let task = tokio::spawn(this.clone().establish());
            this.spawn_task(task);
            Ok(())
        })
    }

    fn send(
        &self,
        envelope: ProtocolEnvelope,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let this = self.clone();
        Box::pin(async move {
            match *this.inner.state.read().await {
                TransportState::Connected => {}
                TransportState::Closed => return Err(TransportError::Closed),
                other => return Err(TransportError::invalid_state("send", other)),
            }

            let message = if envelope.format.is_binary() {
                Message::Binary(envelope.payload.clone())
            } else {
                let text = String::from_utf8(envelope.payload.to_vec())
                    .map_err(|err| TransportError::SerializationFailed(err.to_string()))?;
                Message::Text(text.into())
            };

            let mut writer = this.inner.writer.lock().await;
            let Some(sink) = writer.as_mut() else {
                return Err(TransportError::SendFailed(
                    "connection writer unavailable".to_string(),
                ));
            };
            sink.send(message)
                .await
                .map_err(|err| TransportError::SendFailed(err.to_string()))?;
            this.inner.metrics.record_send(envelope.len());
            Ok(())
        })
    }

    fn receive(
        &self,
        envelope: ProtocolEnvelope,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let this = self.clone();
        Box::pin(async move {
            if *this.inner.state.read().await == TransportState::Closed {
                return Err(TransportError::Closed);
            }
            this.inner.metrics.record_receive(envelope.len());
            this.inner.coordinator.envelope_received(&this, envelope);
            Ok(())
        })
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let this = self.clone();
        Box::pin(async move {
            let previous = {
                let mut state = this.inner.state.write().await;
                let previous = *state;
                *state = TransportState::Closed;
                previous
            };
            if previous == TransportState::Closed {
                return;
            }
            debug!(
                session_id = %this.inner.session_id,
                from = %previous,
                "closing websocket transport"
            );
            let _ = this.inner.shutdown_tx.send(());
            this.deliver_unavailable_if_pending(&TransportError::Closed);
            if let Some(mut sink) = this.inner.writer.lock().await.take() {
                let _ = sink.close().await;
            }
            let handles: Vec<_> = this
                .inner
                .task_handles
                .lock()
                .expect("task handle mutex poisoned")
                .drain(..)
                .collect();
            for handle in handles {
                handle.abort();
            }
        })
    }

    fn host(&self) -> &str {
        &self.inner.params.host
    }

    fn url(&self) -> &str {
        &self.inner.url
    }

    fn metrics(&self) -> Pin<Box<dyn Future<Output = TransportMetrics> + Send + '_>> {
        Box::pin(async move { self.inner.metrics.snapshot() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulselink_transport::{ChannelConnectListener, ClientConfig, SessionState};

    fn transport() -> WebSocketTransport {
        let (coordinator, _events) = ChannelConnectListener::new();
        let params = TransportParams::new("127.0.0.1", 9999, false, ClientConfig::default())
            .with_agent("pulselink-rust/0.1.0");
        WebSocketTransport::new(params, WebSocketConfig::default(), Arc::new(coordinator))
            .unwrap()
    }

    #[tokio::test]
    async fn test_new_transport_is_idle() {
        let transport = transport();
        assert_eq!(transport.state().await, TransportState::Idle);
        assert_eq!(transport.kind(), TransportKind::WebSocket);
        assert_eq!(transport.mode(), ConnectionMode::Clean);
    }

    #[tokio::test]
    async fn test_url_carries_negotiated_query() {
        let (coordinator, _events) = ChannelConnectListener::new();
        let params = TransportParams::new(
            "realtime.example.com",
            443,
            true,
            ClientConfig::default().with_binary_protocol(true),
        )
        .with_session(SessionState::resuming("abc123", Some(42)))
        .with_agent("pulselink-rust/0.1.0");
        let transport =
            WebSocketTransport::new(params, WebSocketConfig::default(), Arc::new(coordinator))
                .unwrap();

        assert_eq!(transport.host(), "realtime.example.com");
        assert_eq!(
            transport.url(),
            "wss://realtime.example.com/?v=2&format=msgpack&resume=abc123\
             &connectionSerial=42&agent=pulselink-rust%2F0.1.0"
        );
        assert_eq!(transport.mode(), ConnectionMode::Resume);
    }

    #[tokio::test]
    async fn test_send_before_connect_is_a_state_violation() {
        let transport = transport();
        let err = transport
            .send(ProtocolEnvelope::json(&b"{}"[..]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let transport = transport();
        transport.close().await;
        assert_eq!(transport.state().await, TransportState::Closed);
        transport.close().await;
        assert_eq!(transport.state().await, TransportState::Closed);
    }

    #[tokio::test]
    async fn test_operations_after_close_fail_closed() {
        let (listener, _events) = ChannelConnectListener::new();
        let transport = transport();
        transport.close().await;

        let err = transport
            .connect(Arc::new(listener))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Closed));

        let err = transport
            .send(ProtocolEnvelope::json(&b"{}"[..]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }

    #[tokio::test]
    async fn test_metrics_start_empty() {
        let transport = transport();
        let metrics = transport.metrics().await;
        assert_eq!(metrics.messages_sent, 0);
        assert_eq!(metrics.connections, 0);
    }
}
