//! ConnMan manager proxy.

use std::collections::HashMap;
use zbus::proxy;
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue};

/// Proxy for the `net.connman.Manager` interface.
///
/// The manager is the entry point for enumerating technologies and
/// services, and for registering the credentials agent.
#[proxy(
    interface = "net.connman.Manager",
    default_service = "net.connman",
    default_path = "/"
)]
pub trait ConnmanManager {
    /// Returns every technology as `(path, properties)`.
    fn get_technologies(
        &self,
    ) -> zbus::Result<Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>>;

    /// Returns every known service as `(path, properties)`, ordered by
    /// ConnMan's preference.
    fn get_services(&self) -> zbus::Result<Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>>;

    /// Registers an agent object for credential requests.
    fn register_agent(&self, path: &ObjectPath<'_>) -> zbus::Result<()>;

    /// Signal emitted when services are added, changed, or removed.
    ///
    /// `changed` only carries the properties that changed for services that
    /// already existed, so it is not an authoritative list.
    #[zbus(signal)]
    fn services_changed(
        &self,
        changed: Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>,
        removed: Vec<OwnedObjectPath>,
    ) -> zbus::Result<()>;
}
