//! Counters for discovery and broadcast activity

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters shared by the discovery handler and the broadcaster
#[derive(Debug)]
pub struct BeaconStats {
    started_at: Instant,
    broadcasts: AtomicU64,
    datagrams_attempted: AtomicU64,
    send_failures: AtomicU64,
    bytes_sent: AtomicU64,
    services_matched: AtomicU64,
    services_rejected: AtomicU64,
    services_skipped: AtomicU64,
    services_removed: AtomicU64,
}

impl BeaconStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            broadcasts: AtomicU64::new(0),
            datagrams_attempted: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            services_matched: AtomicU64::new(0),
            services_rejected: AtomicU64::new(0),
            services_skipped: AtomicU64::new(0),
            services_removed: AtomicU64::new(0),
        }
    }

    /// Record one broadcast call that fanned out to `attempted` endpoints
    pub fn record_broadcast(&self, attempted: usize) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.datagrams_attempted.fetch_add(attempted as u64, Ordering::Relaxed);
    }

    pub fn record_sent(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_matched(&self) {
        self.services_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.services_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.services_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removed(&self) {
        self.services_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters into a plain struct
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.started_at.elapsed(),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            datagrams_attempted: self.datagrams_attempted.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            services_matched: self.services_matched.load(Ordering::Relaxed),
            services_rejected: self.services_rejected.load(Ordering::Relaxed),
            services_skipped: self.services_skipped.load(Ordering::Relaxed),
            services_removed: self.services_removed.load(Ordering::Relaxed),
        }
    }
}

impl Default for BeaconStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`BeaconStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Time since the counters were created
    pub uptime: Duration,
    /// Broadcast calls that passed tag validation
    pub broadcasts: u64,
    /// Datagram sends attempted across all broadcasts
    pub datagrams_attempted: u64,
    /// Datagram sends that returned an error or timed out
    pub send_failures: u64,
    /// Payload bytes handed to the transport successfully
    pub bytes_sent: u64,
    /// Matching services newly registered or re-addressed; refreshes are not counted
    pub services_matched: u64,
    /// Appeared services that advertised a different payload tag
    pub services_rejected: u64,
    /// Appeared services skipped for missing or unresolvable metadata
    pub services_skipped: u64,
    /// Registered endpoints dropped because the service vanished or stopped matching
    pub services_removed: u64,
}

impl StatsSnapshot {
    /// Fraction of attempted datagrams that failed locally
    pub fn failure_ratio(&self) -> f64 {
        if self.datagrams_attempted > 0 {
            self.send_failures as f64 / self.datagrams_attempted as f64
        } else {
            0.0
        }
    }
}
