//! In-memory discovery source
//!
//! Stands in for mDNS in tests and demos: services are announced and
//! withdrawn by hand through a [`MemoryAnnouncer`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};

use crate::capability::ServiceMetadata;
use crate::registry::ServiceName;

use super::error::DiscoveryError;
use super::event::{DiscoveryEvent, DiscoverySource, ServiceResolver};

/// Resolver over a shared in-memory service table
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    services: Arc<RwLock<HashMap<ServiceName, ServiceMetadata>>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make metadata resolvable under `name`
    pub async fn insert(&self, name: ServiceName, metadata: ServiceMetadata) {
        self.services.write().await.insert(name, metadata);
    }

    pub async fn remove(&self, name: &ServiceName) -> Option<ServiceMetadata> {
        self.services.write().await.remove(name)
    }
}

impl ServiceResolver for MemoryResolver {
    async fn resolve(&self, name: &ServiceName) -> Result<ServiceMetadata, DiscoveryError> {
        self.services
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| DiscoveryError::ResolutionFailed(name.clone()))
    }
}

/// Discovery source fed by a [`MemoryAnnouncer`]
pub struct MemoryDiscovery {
    service_type: String,
    resolver: MemoryResolver,
    events: Option<mpsc::Receiver<DiscoveryEvent>>,
}

impl MemoryDiscovery {
    /// Create a source and the announcer that drives it
    ///
    /// Announcements made before `start()` are buffered up to `capacity`.
    pub fn new(service_type: impl Into<String>, capacity: usize) -> (Self, MemoryAnnouncer) {
        let service_type = service_type.into();
        let resolver = MemoryResolver::new();
        let (tx, rx) = mpsc::channel(capacity.max(1));

        let discovery = Self {
            service_type: service_type.clone(),
            resolver: resolver.clone(),
            events: Some(rx),
        };
        let announcer = MemoryAnnouncer {
            service_type,
            resolver,
            tx,
        };

        (discovery, announcer)
    }
}

impl DiscoverySource for MemoryDiscovery {
    type Resolver = MemoryResolver;

    fn start(&mut self) -> Result<mpsc::Receiver<DiscoveryEvent>, DiscoveryError> {
        let events = self.events.take().ok_or_else(|| {
            DiscoveryError::BrowseFailed(format!("{} is already being watched", self.service_type))
        })?;

        tracing::info!(service_type = %self.service_type, "Started in-memory discovery");
        Ok(events)
    }

    fn stop(&mut self) -> Result<(), DiscoveryError> {
        tracing::info!(service_type = %self.service_type, "Stopped in-memory discovery");
        Ok(())
    }

    fn resolver(&self) -> MemoryResolver {
        self.resolver.clone()
    }
}

/// Handle for announcing and withdrawing in-memory services
#[derive(Debug, Clone)]
pub struct MemoryAnnouncer {
    service_type: String,
    resolver: MemoryResolver,
    tx: mpsc::Sender<DiscoveryEvent>,
}

impl MemoryAnnouncer {
    /// Publish a service and notify the watcher
    pub async fn announce(
        &self,
        name: impl Into<ServiceName>,
        metadata: ServiceMetadata,
    ) -> Result<(), DiscoveryError> {
        let name = name.into();
        self.resolver.insert(name.clone(), metadata).await;
        self.notify(DiscoveryEvent::ServiceAppeared {
            name,
            service_type: self.service_type.clone(),
        })
        .await
    }

    /// Notify an appearance without making metadata resolvable
    pub async fn announce_unresolvable(
        &self,
        name: impl Into<ServiceName>,
    ) -> Result<(), DiscoveryError> {
        let name = name.into();
        self.resolver.remove(&name).await;
        self.notify(DiscoveryEvent::ServiceAppeared {
            name,
            service_type: self.service_type.clone(),
        })
        .await
    }

    /// Withdraw a service and notify the watcher
    pub async fn withdraw(&self, name: impl Into<ServiceName>) -> Result<(), DiscoveryError> {
        let name = name.into();
        self.resolver.remove(&name).await;
        self.notify(DiscoveryEvent::ServiceVanished {
            name,
            service_type: self.service_type.clone(),
        })
        .await
    }

    async fn notify(&self, event: DiscoveryEvent) -> Result<(), DiscoveryError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| DiscoveryError::NotStarted)
    }
}
