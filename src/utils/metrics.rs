//! Observability and Metrics
//!
//! Counters for MAP exchanges, kept in atomics so one collector can be
//! shared by several clients.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ProtocolError;

/// Metrics collector for MAP exchanges
#[derive(Debug)]
pub struct Metrics {
    /// Requests handed to the transport
    pub requests_sent: AtomicU64,
    /// Datagrams received in reply
    pub responses_received: AtomicU64,
    /// Responses that passed validation
    pub mappings_granted: AtomicU64,
    /// Responses rejected by this client (size, version, nonce, ...)
    pub responses_rejected: AtomicU64,
    /// Responses carrying a non-success result code
    pub server_errors: AtomicU64,
    /// Transport-level failures
    pub transport_errors: AtomicU64,
    /// Total bytes sent
    pub bytes_sent: AtomicU64,
    /// Total bytes received
    pub bytes_received: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_sent: AtomicU64::new(0),
            responses_received: AtomicU64::new(0),
            mappings_granted: AtomicU64::new(0),
            responses_rejected: AtomicU64::new(0),
            server_errors: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request sent
    pub fn request_sent(&self, byte_count: u64) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a response received
    pub fn response_received(&self, byte_count: u64) {
        self.responses_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record an accepted mapping
    pub fn mapping_granted(&self) {
        self.mappings_granted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed exchange, bucketed by cause
    pub fn exchange_failed(&self, error: &ProtocolError) {
        let counter = match error {
            ProtocolError::ServerResult(_) | ProtocolError::ServerUnsupportedVersion => {
                &self.server_errors
            }
            ProtocolError::Io(_) | ProtocolError::TransportError(_) => &self.transport_errors,
            _ => &self.responses_rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            responses_received: self.responses_received.load(Ordering::Relaxed),
            mappings_granted: self.mappings_granted.load(Ordering::Relaxed),
            responses_rejected: self.responses_rejected.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            requests_sent = snapshot.requests_sent,
            responses_received = snapshot.responses_received,
            mappings_granted = snapshot.mappings_granted,
            responses_rejected = snapshot.responses_rejected,
            server_errors = snapshot.server_errors,
            transport_errors = snapshot.transport_errors,
            bytes_sent = snapshot.bytes_sent,
            bytes_received = snapshot.bytes_received,
            uptime_seconds = snapshot.uptime_seconds,
            "PCP client metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub mappings_granted: u64,
    pub responses_rejected: u64,
    pub server_errors: u64,
    pub transport_errors: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub uptime_seconds: u64,
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::header::ResultCode;

    #[test]
    fn test_failures_are_bucketed() {
        let metrics = Metrics::new();
        metrics.exchange_failed(&ProtocolError::NonceMismatch);
        metrics.exchange_failed(&ProtocolError::InvalidLength(3));
        metrics.exchange_failed(&ProtocolError::ServerResult(ResultCode::NoResources));
        metrics.exchange_failed(&ProtocolError::TransportError("down".into()));

        let snap = metrics.snapshot();
        assert_eq!(snap.responses_rejected, 2);
        assert_eq!(snap.server_errors, 1);
        assert_eq!(snap.transport_errors, 1);
    }

    #[test]
    fn test_byte_counters() {
        let metrics = Metrics::new();
        metrics.request_sent(60);
        metrics.response_received(60);
        metrics.mapping_granted();

        let snap = metrics.snapshot();
        assert_eq!(snap.requests_sent, 1);
        assert_eq!(snap.bytes_sent, 60);
        assert_eq!(snap.bytes_received, 60);
        assert_eq!(snap.mappings_granted, 1);
    }
}
