//! Discovery notifications and the collaborator traits behind them

use std::future::Future;

use tokio::sync::mpsc;

use crate::capability::ServiceMetadata;
use crate::registry::ServiceName;

use super::error::DiscoveryError;

/// Notification delivered by a discovery source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// A service instance was found on the network
    ServiceAppeared {
        name: ServiceName,
        service_type: String,
    },
    /// A service instance went away
    ServiceVanished {
        name: ServiceName,
        service_type: String,
    },
}

impl DiscoveryEvent {
    /// Name of the service the event refers to
    pub fn name(&self) -> &ServiceName {
        match self {
            DiscoveryEvent::ServiceAppeared { name, .. } => name,
            DiscoveryEvent::ServiceVanished { name, .. } => name,
        }
    }
}

/// Looks up the metadata of a discovered service
pub trait ServiceResolver: Send + Sync {
    /// Resolve the metadata advertised under `name`
    fn resolve(
        &self,
        name: &ServiceName,
    ) -> impl Future<Output = Result<ServiceMetadata, DiscoveryError>> + Send;
}

/// A process-wide discovery client with an explicit lifecycle
///
/// `start()` begins watching and hands back the notification channel;
/// `stop()` ends the watch. The resolver is handed to the event handler.
pub trait DiscoverySource: Send {
    /// Resolver backed by this source
    type Resolver: ServiceResolver + 'static;

    /// Begin watching for services
    fn start(&mut self) -> Result<mpsc::Receiver<DiscoveryEvent>, DiscoveryError>;

    /// Stop watching
    fn stop(&mut self) -> Result<(), DiscoveryError>;

    /// Get a resolver for services reported by this source
    fn resolver(&self) -> Self::Resolver;
}
