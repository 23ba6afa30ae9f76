//! Beacon lifecycle
//!
//! Owns the discovery source, the registry and the sending socket, and wires
//! them together on `start()`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::broadcast::{Broadcaster, UdpTransport};
use crate::capability::{CapabilityMatcher, PayloadTypeTag};
use crate::discovery::{DiscoveryHandler, DiscoverySource, MdnsDiscovery};
use crate::error::{Error, Result};
use crate::producer::PayloadSource;
use crate::registry::EndpointRegistry;
use crate::stats::BeaconStats;

use super::config::BeaconConfig;

/// Discovery-driven sensor event broadcaster
///
/// # Example
/// ```no_run
/// use sensor_beacon::{Beacon, BeaconConfig, PhEventSource};
///
/// # async fn example() -> sensor_beacon::error::Result<()> {
/// let mut beacon = Beacon::mdns(BeaconConfig::default())?;
/// let mut source = PhEventSource::constant(7.0);
///
/// beacon
///     .run_until(&mut source, async {
///         let _ = tokio::signal::ctrl_c().await;
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Beacon<D: DiscoverySource> {
    config: BeaconConfig,
    discovery: D,
    registry: Arc<EndpointRegistry>,
    stats: Arc<BeaconStats>,
    broadcaster: Option<Broadcaster<UdpTransport>>,
    watch: Option<JoinHandle<()>>,
}

impl Beacon<MdnsDiscovery> {
    /// Create a beacon discovering consumers over multicast DNS
    pub fn mdns(config: BeaconConfig) -> Result<Self> {
        let discovery = MdnsDiscovery::with_port(config.service_type.clone(), config.mdns_port)?
            .channel_capacity(config.event_channel_capacity);
        Ok(Self::new(config, discovery))
    }
}

impl<D: DiscoverySource> Beacon<D> {
    /// Create a beacon over an arbitrary discovery source
    pub fn new(config: BeaconConfig, discovery: D) -> Self {
        Self {
            config,
            discovery,
            registry: Arc::new(EndpointRegistry::new()),
            stats: Arc::new(BeaconStats::new()),
            broadcaster: None,
            watch: None,
        }
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    /// Get a reference to the endpoint registry
    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> &Arc<BeaconStats> {
        &self.stats
    }

    pub fn is_running(&self) -> bool {
        self.watch.is_some()
    }

    /// Local address of the sending socket while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.broadcaster
            .as_ref()
            .and_then(|b| b.transport().local_addr().ok())
    }

    /// Bind the sending socket and begin watching for consumers
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(Error::AlreadyRunning);
        }

        let transport = UdpTransport::bind(self.config.bind_addr).await?;
        let events = self.discovery.start()?;

        let matcher = CapabilityMatcher::with_descriptors(self.config.descriptors.clone());
        let handler = DiscoveryHandler::new(
            Arc::clone(&self.registry),
            matcher,
            self.config.payload_tag.clone(),
            self.discovery.resolver(),
        )
        .resolve_timeout(self.config.resolve_timeout)
        .with_stats(Arc::clone(&self.stats));

        self.watch = Some(tokio::spawn(handler.run(events)));
        self.broadcaster = Some(
            Broadcaster::new(
                Arc::clone(&self.registry),
                self.config.payload_tag.clone(),
                transport,
            )
            .send_timeout(self.config.send_timeout)
            .with_stats(Arc::clone(&self.stats)),
        );

        tracing::info!(
            service_type = %self.config.service_type,
            payload_type = %self.config.payload_tag,
            local = ?self.local_addr(),
            "Beacon started"
        );

        Ok(())
    }

    /// Send one payload to every registered consumer
    ///
    /// Returns the number of endpoints a send was attempted to.
    pub async fn broadcast(&self, payload: &[u8], tag: &PayloadTypeTag) -> Result<usize> {
        let broadcaster = self.broadcaster.as_ref().ok_or(Error::NotRunning)?;
        Ok(broadcaster.send(payload, tag).await?)
    }

    /// Cancel the discovery watch, then close the socket
    ///
    /// The registry is cleared so a later `start()` begins from scratch.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(watch) = self.watch.take() else {
            return Ok(());
        };

        watch.abort();
        if let Err(e) = watch.await {
            if !e.is_cancelled() {
                tracing::warn!(error = %e, "Discovery watch ended abnormally");
            }
        }

        let stopped = self.discovery.stop();
        self.broadcaster = None;
        self.registry.clear().await;

        tracing::info!("Beacon stopped");
        stopped.map_err(Error::from)
    }

    /// Broadcast from `source` every publish interval until `shutdown` completes
    ///
    /// Starts the beacon if needed and always stops it before returning. A
    /// payload tag mismatch ends the loop with an error.
    pub async fn run_until<P, F>(&mut self, source: &mut P, shutdown: F) -> Result<()>
    where
        P: PayloadSource,
        F: Future<Output = ()>,
    {
        if !self.is_running() {
            self.start().await?;
        }

        let mut ticker = tokio::time::interval(self.config.publish_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received");
                    break Ok(());
                }
                _ = ticker.tick() => {
                    let payload = source.next_payload();
                    if let Err(e) = self.broadcast(&payload, source.tag()).await {
                        tracing::error!(error = %e, "Broadcast loop aborted");
                        break Err(e);
                    }
                }
            }
        };

        let stopped = self.stop().await;
        result.and(stopped)
    }
}

impl<D: DiscoverySource> Drop for Beacon<D> {
    fn drop(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.abort();
        }
    }
}
