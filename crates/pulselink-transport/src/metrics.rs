//! Transport metrics types.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A serializable snapshot of a transport's traffic counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMetrics {
    /// Total number of bytes sent.
    pub bytes_sent: u64,

    /// Total number of bytes received.
    pub bytes_received: u64,

    /// Total number of envelopes sent.
    pub messages_sent: u64,

    /// Total number of envelopes received.
    pub messages_received: u64,

    /// Total number of connection attempts.
    pub connections: u64,

    /// Total number of failed connection attempts.
    pub failed_connections: u64,
}

/// Lock-free counters a transport updates on its hot paths.
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    /// Total bytes sent.
    pub bytes_sent: AtomicU64,

    /// Total bytes received.
    pub bytes_received: AtomicU64,

    /// Total envelopes sent.
    pub messages_sent: AtomicU64,

    /// Total envelopes received.
    pub messages_received: AtomicU64,

    /// Total connection attempts.
    pub connections: AtomicU64,

    /// Failed connection attempts.
    pub failed_connections: AtomicU64,
}

impl AtomicMetrics {
    /// Creates a new set of counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sent envelope of `bytes` bytes.
    pub fn record_send(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Records a received envelope of `bytes` bytes.
    pub fn record_receive(&self, bytes: usize) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Records the start of a connection attempt.
    pub fn record_connect_attempt(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed connection attempt.
    pub fn record_connect_failure(&self) {
        self.failed_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Creates a serializable snapshot of the current counter values.
    pub fn snapshot(&self) -> TransportMetrics {
        TransportMetrics {
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            connections: self.connections.load(Ordering::Relaxed),
            failed_connections: self.failed_connections.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_start_at_zero() {
        let metrics = AtomicMetrics::new();
        assert_eq!(metrics.snapshot(), TransportMetrics::default());
    }

    #[test]
    fn test_record_traffic() {
        let metrics = AtomicMetrics::new();
        metrics.record_send(100);
        metrics.record_send(20);
        metrics.record_receive(7);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_sent, 2);
        assert_eq!(snapshot.bytes_sent, 120);
        assert_eq!(snapshot.messages_received, 1);
        assert_eq!(snapshot.bytes_received, 7);
    }

    #[test]
    fn test_record_connection_outcomes() {
        let metrics = AtomicMetrics::new();
        metrics.record_connect_attempt();
        metrics.record_connect_attempt();
        metrics.record_connect_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connections, 2);
        assert_eq!(snapshot.failed_connections, 1);
    }
}
