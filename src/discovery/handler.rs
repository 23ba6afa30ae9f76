//! Discovery event handler
//!
//! Turns appeared/vanished notifications into registry updates. Each service
//! name moves between two states only:
//!
//! ```text
//!              appeared + match
//!   unknown ───────────────────────► registered
//!      ▲                                 │
//!      └──────── vanished ◄──────────────┘
//! ```
//!
//! Metadata is resolved before any registry lock is taken, so a slow
//! resolution never stalls the broadcast loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::capability::{CapabilityMatcher, PayloadTypeTag};
use crate::registry::{Endpoint, EndpointRegistry, ServiceName};
use crate::stats::BeaconStats;

use super::error::DiscoveryError;
use super::event::{DiscoveryEvent, ServiceResolver};

/// What handling a single notification did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The service matched and its endpoint is now registered
    Registered(Endpoint),
    /// The service advertises a different payload tag
    Rejected,
    /// Metadata was missing or could not be resolved; nothing changed
    Skipped,
    /// The service vanished; carries the endpoint that was dropped, if any
    Removed(Option<Endpoint>),
}

/// Applies discovery notifications to the endpoint registry
pub struct DiscoveryHandler<R> {
    registry: Arc<EndpointRegistry>,
    matcher: CapabilityMatcher,
    expected: PayloadTypeTag,
    resolver: R,
    resolve_timeout: Duration,
    stats: Arc<BeaconStats>,
}

impl<R: ServiceResolver> DiscoveryHandler<R> {
    /// Create a handler registering services that accept `expected`
    pub fn new(
        registry: Arc<EndpointRegistry>,
        matcher: CapabilityMatcher,
        expected: PayloadTypeTag,
        resolver: R,
    ) -> Self {
        Self {
            registry,
            matcher,
            expected,
            resolver,
            resolve_timeout: Duration::from_secs(3),
            stats: Arc::new(BeaconStats::new()),
        }
    }

    /// Bound how long a single metadata lookup may take
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Share a stats instance with other components
    pub fn with_stats(mut self, stats: Arc<BeaconStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    /// Handle a single notification to completion
    pub async fn handle(&self, event: DiscoveryEvent) -> HandleOutcome {
        match event {
            DiscoveryEvent::ServiceAppeared { name, service_type } => {
                self.on_service_appeared(&name, &service_type).await
            }
            DiscoveryEvent::ServiceVanished { name, service_type } => {
                self.on_service_vanished(&name, &service_type).await
            }
        }
    }

    /// A service was found: resolve, match, and register on success
    pub async fn on_service_appeared(
        &self,
        name: &ServiceName,
        service_type: &str,
    ) -> HandleOutcome {
        tracing::debug!(
            service = %name,
            instance = name.instance(),
            service_type,
            "Service appeared"
        );

        let endpoint = match self.resolve_endpoint(name).await {
            Ok(resolved) => resolved,
            Err(skip) => {
                self.stats.record_skipped();
                tracing::warn!(
                    instance = name.instance(),
                    reason = %skip,
                    "Skipping service"
                );
                return HandleOutcome::Skipped;
            }
        };

        match endpoint {
            Some(endpoint) => {
                let previous = self.registry.put(name.clone(), endpoint).await;
                if previous != Some(endpoint) {
                    self.stats.record_matched();
                }
                HandleOutcome::Registered(endpoint)
            }
            None => {
                self.stats.record_rejected();
                // A registered name re-advertised under another tag is no longer a receiver
                if let Some(stale) = self.registry.remove(name).await {
                    self.stats.record_removed();
                    tracing::info!(
                        service = %name,
                        endpoint = %stale,
                        "Service no longer accepts payload type"
                    );
                }
                tracing::debug!(
                    service = %name,
                    expected = %self.expected,
                    "Payload type mismatch"
                );
                HandleOutcome::Rejected
            }
        }
    }

    /// A service went away: drop it unconditionally
    pub async fn on_service_vanished(
        &self,
        name: &ServiceName,
        service_type: &str,
    ) -> HandleOutcome {
        tracing::debug!(
            service = %name,
            instance = name.instance(),
            service_type,
            "Service vanished"
        );

        let removed = self.registry.remove(name).await;
        if removed.is_some() {
            self.stats.record_removed();
        }

        HandleOutcome::Removed(removed)
    }

    /// Consume notifications until the channel closes
    pub async fn run(self, mut events: mpsc::Receiver<DiscoveryEvent>) {
        tracing::info!(payload_type = %self.expected, "Discovery watch started");

        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }

        tracing::info!("Discovery watch ended");
    }

    /// `Ok(Some)` for a matching service, `Ok(None)` for a tag mismatch,
    /// `Err` when the service must be skipped
    async fn resolve_endpoint(&self, name: &ServiceName) -> Result<Option<Endpoint>, SkipReason> {
        let lookup = tokio::time::timeout(self.resolve_timeout, self.resolver.resolve(name));
        let metadata = match lookup.await {
            Ok(Ok(metadata)) => metadata,
            Ok(Err(e)) => return Err(SkipReason::Discovery(e)),
            Err(_) => {
                return Err(SkipReason::Discovery(DiscoveryError::ResolutionFailed(
                    name.clone(),
                )))
            }
        };

        let matched = self
            .matcher
            .matches(&metadata, &self.expected)
            .map_err(SkipReason::Capability)?;
        if !matched {
            return Ok(None);
        }

        metadata
            .endpoint()
            .map(Some)
            .ok_or_else(|| SkipReason::Discovery(DiscoveryError::NoAddress(name.clone())))
    }
}

enum SkipReason {
    Discovery(DiscoveryError),
    Capability(crate::capability::CapabilityError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Discovery(e) => write!(f, "{}", e),
            SkipReason::Capability(e) => write!(f, "{}", e),
        }
    }
}
