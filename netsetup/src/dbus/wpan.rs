//! wpantund proxy.

use std::collections::HashMap;
use zbus::{Result, proxy};
use zvariant::OwnedValue;

/// Proxy for the `org.wpantund.v1` interface on `wpan0`.
#[proxy(
    interface = "org.wpantund.v1",
    default_service = "com.nestlabs.WPANTunnelDriver",
    default_path = "/org/wpantund/wpan0"
)]
pub trait Wpan {
    /// Returns the NCP status dictionary (`NCP:State`, `Network:Name`, ...).
    fn status(&self) -> Result<HashMap<String, OwnedValue>>;

    /// Reads a single property. Returns `(status, value)`.
    fn prop_get(&self, key: &str) -> Result<(i32, OwnedValue)>;

    /// Signal emitted whenever an NCP property changes.
    #[zbus(signal)]
    fn prop_changed(&self, key: String, value: OwnedValue) -> Result<()>;
}
