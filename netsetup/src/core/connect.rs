//! Joining a Wi-Fi network by name.

use log::{debug, info, warn};

use crate::Result;
use crate::api::models::{ConnectionError, Credentials, MediumType};
use crate::bus::Bus;
use crate::core::agent::Agent;
use crate::core::directory;
use crate::core::scan::Scanner;

/// Scans, looks `name` up, and connects to it.
///
/// The agent is loaded with `(name, passphrase)` before anything reaches the
/// bus, so a `RequestInput` call that ConnMan issues during `Connect` is
/// always answered with these credentials. The agent call itself is not
/// awaited here; it happens inside ConnMan's handling of the connect.
///
/// Fails with `ServiceNotFound` without issuing a connect when no Wi-Fi
/// service of that exact name is visible after the scan settles.
pub(crate) async fn connect(
    bus: &dyn Bus,
    scanner: &Scanner,
    agent: &Agent,
    name: &str,
    passphrase: &str,
) -> Result<()> {
    let session = scanner.begin()?;
    agent.set_credentials(Credentials::new(name, passphrase));

    let visible = scanner.scan_in(bus, &session).await?;
    debug!("Scan settled with {} Wi-Fi services", visible.len());

    let Some(path) = directory::find_by_name(bus, &MediumType::Wifi, name).await else {
        warn!("Network {name:?} not found after scan");
        return Err(ConnectionError::ServiceNotFound(name.to_string()));
    };

    debug!("Connecting to {name} at {path}");
    bus.connect_service(&path).await.inspect_err(|e| {
        warn!("Connect to {name} failed: {e}");
    })?;

    info!("Connected to {name}");
    Ok(())
}
