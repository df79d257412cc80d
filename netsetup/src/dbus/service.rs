//! ConnMan service proxy.

use zbus::{Result, proxy};

/// Proxy for a `net.connman.Service` object.
#[proxy(interface = "net.connman.Service", default_service = "net.connman")]
pub trait ConnmanService {
    /// Connects the service. Secured networks trigger an agent
    /// `RequestInput` call before the reply arrives.
    fn connect(&self) -> Result<()>;
}
