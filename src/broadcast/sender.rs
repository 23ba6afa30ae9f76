//! Broadcaster implementation
//!
//! Fans a serialized payload out to every endpoint in the registry. The
//! registry is snapshotted first and the lock released before any datagram
//! goes out; a failing endpoint is counted and skipped.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::capability::PayloadTypeTag;
use crate::registry::EndpointRegistry;
use crate::stats::BeaconStats;

use super::error::{BroadcastError, SendFailure};
use super::transport::{DatagramTransport, UdpTransport};

/// Outcome of one fan-out
#[derive(Debug, Default)]
pub struct SendReport {
    /// Endpoints a send was attempted to
    pub attempted: usize,
    /// Endpoints whose send failed locally
    pub failures: Vec<SendFailure>,
}

impl SendReport {
    /// Number of datagrams handed to the transport without error
    ///
    /// The transport is unacknowledged, so this is not a delivery count.
    pub fn sent(&self) -> usize {
        self.attempted - self.failures.len()
    }
}

/// Sends payloads of one type to all registered consumers
pub struct Broadcaster<T = UdpTransport> {
    registry: Arc<EndpointRegistry>,
    tag: PayloadTypeTag,
    transport: T,
    send_timeout: Duration,
    stats: Arc<BeaconStats>,
}

impl<T: DatagramTransport> Broadcaster<T> {
    /// Create a broadcaster for payloads tagged `tag`
    pub fn new(registry: Arc<EndpointRegistry>, tag: PayloadTypeTag, transport: T) -> Self {
        Self {
            registry,
            tag,
            transport,
            send_timeout: Duration::from_millis(100),
            stats: Arc::new(BeaconStats::new()),
        }
    }

    /// Bound how long a single datagram send may wait for buffer space
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Share a stats instance with other components
    pub fn with_stats(mut self, stats: Arc<BeaconStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Payload tag this broadcaster accepts
    pub fn tag(&self) -> &PayloadTypeTag {
        &self.tag
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `payload` to every registered endpoint
    ///
    /// Returns the number of endpoints a send was attempted to. Fails only
    /// when `tag` is not this broadcaster's tag, in which case nothing is sent.
    pub async fn send(
        &self,
        payload: &[u8],
        tag: &PayloadTypeTag,
    ) -> Result<usize, BroadcastError> {
        self.send_with_report(payload, tag)
            .await
            .map(|report| report.attempted)
    }

    /// Like [`send`](Self::send), but also returns the per-endpoint failures
    pub async fn send_with_report(
        &self,
        payload: &[u8],
        tag: &PayloadTypeTag,
    ) -> Result<SendReport, BroadcastError> {
        if *tag != self.tag {
            return Err(BroadcastError::TypeMismatch {
                expected: self.tag.clone(),
                actual: tag.clone(),
            });
        }

        let endpoints = self.registry.snapshot().await;
        let mut report = SendReport {
            attempted: endpoints.len(),
            failures: Vec::new(),
        };

        for endpoint in endpoints {
            let send = self.transport.send_to(payload, endpoint.addr());
            let error = match tokio::time::timeout(self.send_timeout, send).await {
                Ok(Ok(written)) => {
                    self.stats.record_sent(written);
                    continue;
                }
                Ok(Err(e)) => e,
                Err(_) => io::Error::new(io::ErrorKind::TimedOut, "send buffer full"),
            };

            self.stats.record_send_failure();
            tracing::warn!(endpoint = %endpoint, error = %error, "Datagram send failed");
            report.failures.push(SendFailure { endpoint, error });
        }

        self.stats.record_broadcast(report.attempted);
        tracing::debug!(
            payload_type = %self.tag,
            bytes = payload.len(),
            attempted = report.attempted,
            failed = report.failures.len(),
            "Payload broadcast"
        );

        Ok(report)
    }
}
