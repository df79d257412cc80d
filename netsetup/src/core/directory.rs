//! Service enumeration and lookup.

use log::{debug, warn};
use zvariant::OwnedObjectPath;

use crate::api::models::{MediumType, Service};
use crate::bus::Bus;

/// Lists services of one medium in the order ConnMan reports them.
///
/// Never fails: if ConnMan cannot be reached the condition is logged and an
/// empty list is returned.
pub(crate) async fn list_by_medium(bus: &dyn Bus, kind: &MediumType) -> Vec<Service> {
    match bus.services().await {
        Ok(services) => services.into_iter().filter(|s| &s.kind == kind).collect(),
        Err(e) => {
            warn!("Unable to list {kind} services: {e}");
            Vec::new()
        }
    }
}

/// Returns the path of the first `kind` service named exactly `name`.
///
/// The comparison is case-sensitive.
pub(crate) async fn find_by_name(
    bus: &dyn Bus,
    kind: &MediumType,
    name: &str,
) -> Option<OwnedObjectPath> {
    let found = list_by_medium(bus, kind)
        .await
        .into_iter()
        .find(|s| s.name == name)
        .map(|s| s.path);

    if found.is_none() {
        debug!("No {kind} service named {name:?}");
    }
    found
}
