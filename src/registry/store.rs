//! Endpoint registry implementation
//!
//! Shared between the discovery watch task (writer) and the broadcast loop
//! (reader). Every call takes the lock for exactly its own duration; the
//! broadcaster works from a copied snapshot so no lock is held during I/O.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::entry::{Endpoint, ServiceName};

/// Live mapping of discovered service names to datagram endpoints
///
/// At most one endpoint per name. Membership changes only through explicit
/// calls; there is no expiry.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: RwLock<HashMap<ServiceName, Endpoint>>,
}

impl EndpointRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the endpoint for a service
    ///
    /// Returns the endpoint previously stored under this name, if any.
    pub async fn put(&self, name: ServiceName, endpoint: Endpoint) -> Option<Endpoint> {
        let mut endpoints = self.endpoints.write().await;
        let previous = endpoints.insert(name.clone(), endpoint);

        match previous {
            Some(old) if old != endpoint => {
                tracing::info!(
                    service = %name,
                    old = %old,
                    new = %endpoint,
                    "Endpoint replaced"
                );
            }
            Some(_) => {
                tracing::debug!(service = %name, endpoint = %endpoint, "Endpoint refreshed");
            }
            None => {
                tracing::info!(
                    service = %name,
                    endpoint = %endpoint,
                    endpoints = endpoints.len(),
                    "Endpoint registered"
                );
            }
        }

        previous
    }

    /// Remove the endpoint for a service
    ///
    /// Absent names are ignored: a vanish notification may follow an
    /// appearance that was never registered.
    pub async fn remove(&self, name: &ServiceName) -> Option<Endpoint> {
        let mut endpoints = self.endpoints.write().await;
        let removed = endpoints.remove(name);

        if let Some(endpoint) = removed {
            tracing::info!(
                service = %name,
                endpoint = %endpoint,
                endpoints = endpoints.len(),
                "Endpoint removed"
            );
        }

        removed
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut endpoints = self.endpoints.write().await;
        let count = endpoints.len();
        endpoints.clear();

        tracing::info!(cleared = count, "Registry cleared");
    }

    /// Point-in-time copy of the registered endpoints
    ///
    /// Later mutations are not reflected in the returned vector.
    pub async fn snapshot(&self) -> Vec<Endpoint> {
        self.endpoints.read().await.values().copied().collect()
    }

    /// Registered service names, sorted
    pub async fn services(&self) -> Vec<ServiceName> {
        let mut names: Vec<_> = self.endpoints.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered endpoints
    pub async fn len(&self) -> usize {
        self.endpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.endpoints.read().await.is_empty()
    }
}
