//! ConnMan technology proxy.

use std::collections::HashMap;
use zbus::{Result, proxy};
use zvariant::{OwnedValue, Value};

/// Proxy for a `net.connman.Technology` object.
#[proxy(interface = "net.connman.Technology", default_service = "net.connman")]
pub trait ConnmanTechnology {
    /// Returns all properties of the technology.
    fn get_properties(&self) -> Result<HashMap<String, OwnedValue>>;

    /// Writes one property (`Powered`, `Tethering`, `TetheringIdentifier`,
    /// `TetheringPassphrase`).
    #[zbus(name = "SetProperty")]
    fn write_property(&self, name: &str, value: &Value<'_>) -> Result<()>;

    /// Scans for services. The reply arrives once the scan completes.
    fn scan(&self) -> Result<()>;
}
