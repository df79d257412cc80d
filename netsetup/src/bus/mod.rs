//! The bus contract the orchestrators are written against.
//!
//! [`Bus`] is the narrow slice of ConnMan the gateway needs: enumerate
//! technologies and services, read and write technology properties, start a
//! scan, connect a service, and subscribe to `ServicesChanged`. The
//! system-bus implementation is [`ConnmanBus`]; tests drive the orchestrators
//! through an in-memory implementation.

mod connman;

pub use connman::ConnmanBus;

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use tokio::sync::watch;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::{Service, Technology, TechnologyProperty};
use crate::core::agent::Agent;

/// A live `ServicesChanged` subscription.
///
/// Each item is the list of services carried by one signal. The payload may
/// be a delta rather than the full list. Dropping the stream cancels the
/// subscription.
pub type ServiceChanges = Pin<Box<dyn Stream<Item = Vec<Service>> + Send>>;

/// Operations consumed from the network management service.
///
/// Every enumeration goes back to the service; implementations must not
/// serve technologies or services from a cache.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Enumerates technologies through the manager object.
    ///
    /// Fails with `ServiceUnavailable` if the manager cannot be reached.
    async fn technologies(&self) -> Result<Vec<Technology>>;

    /// Enumerates services in manager-reported order.
    async fn services(&self) -> Result<Vec<Service>>;

    /// Reads the current properties of one technology object.
    async fn technology_properties(&self, path: &OwnedObjectPath) -> Result<Technology>;

    /// Writes one technology property.
    ///
    /// Fails with `PropertySetFailed` if the write is rejected.
    async fn set_technology_property(
        &self,
        path: &OwnedObjectPath,
        value: TechnologyProperty,
    ) -> Result<()>;

    /// Subscribes to the manager's `ServicesChanged` signal.
    async fn subscribe_services_changed(&self) -> Result<ServiceChanges>;

    /// Asks a technology to scan. Resolves when the request is answered.
    async fn scan(&self, path: &OwnedObjectPath) -> Result<()>;

    /// Asks a service to connect. Resolves when the attempt finishes.
    async fn connect_service(&self, path: &OwnedObjectPath) -> Result<()>;

    /// Exposes `agent` at `path` and registers it with the manager.
    async fn register_agent(&self, path: &str, agent: Agent) -> Result<()>;

    /// Tracks restarts of the management service until `shutdown` fires,
    /// dropping any cached handle whenever its bus name changes owner.
    async fn monitor_owner(&self, shutdown: watch::Receiver<()>) -> Result<()>;
}
