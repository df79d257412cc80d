//! Technology control: locating the radio, power, and tethering.
//!
//! Technologies are looked up again on every call. ConnMan may have been
//! restarted or the adapter replugged since the last operation, so a path
//! from an earlier call is never trusted.

use log::{debug, error, info, warn};
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::{ConnectionError, MediumType, Technology, TechnologyProperty};
use crate::bus::Bus;
use crate::util::utils::{tethering_identifier, validate_passphrase};

/// Returns the first technology whose medium matches `kind`.
///
/// Fails with `ServiceUnavailable` if ConnMan is not running and
/// `TechnologyNotFound` if no such adapter is reported.
pub(crate) async fn locate(bus: &dyn Bus, kind: MediumType) -> Result<Technology> {
    let technologies = bus.technologies().await.inspect_err(|e| {
        error!("Unable to get {kind} technology: {e}");
    })?;

    technologies
        .into_iter()
        .find(|t| t.kind == kind)
        .ok_or_else(|| {
            warn!("No {kind} technology found");
            ConnectionError::TechnologyNotFound(kind)
        })
}

/// Powers the technology on if it is off.
///
/// Reads the current state first; an already powered radio sees no write.
pub(crate) async fn ensure_powered(bus: &dyn Bus, path: &OwnedObjectPath) -> Result<()> {
    let tech = bus.technology_properties(path).await?;
    if tech.powered {
        debug!("{} already powered", tech.name);
        return Ok(());
    }

    bus.set_technology_property(path, TechnologyProperty::Powered(true))
        .await?;
    info!("{} enabled", tech.name);
    Ok(())
}

/// Puts the technology in access-point mode.
///
/// Powers the radio, then writes identifier, passphrase and the enable flag
/// in that order. A failure part way leaves the earlier writes applied; the
/// error names the property that was rejected.
pub(crate) async fn enable_tethering(
    bus: &dyn Bus,
    path: &OwnedObjectPath,
    identifier: &str,
    passphrase: &str,
) -> Result<()> {
    validate_passphrase(passphrase).inspect_err(|e| {
        error!("Refusing to enable tethering: {e}");
    })?;
    ensure_powered(bus, path).await?;

    let writes = [
        TechnologyProperty::TetheringIdentifier(identifier.to_string()),
        TechnologyProperty::TetheringPassphrase(passphrase.to_string()),
        TechnologyProperty::Tethering(true),
    ];

    for value in writes {
        let key = value.key();
        if let Err(e) = bus.set_technology_property(path, value).await {
            error!("Failed to set {key} while enabling tethering: {e}");
            return Err(e);
        }
    }

    info!("Tethering enabled: SSID {identifier}");
    Ok(())
}

/// Turns access-point mode off. Only the enable flag is touched.
///
/// Best effort: a failure is logged and swallowed.
pub(crate) async fn disable_tethering(bus: &dyn Bus, path: &OwnedObjectPath) {
    match bus
        .set_technology_property(path, TechnologyProperty::Tethering(false))
        .await
    {
        Ok(()) => debug!("Tethering disabled on {path}"),
        Err(e) => warn!("Failed to disable tethering on {path}: {e}"),
    }
}

/// Derives the tethering SSID from the Ethernet hardware address:
/// `<prefix>_<AA_BB_CC_DD_EE_FF>`.
///
/// Fails with `AddressUnavailable` if there is no Ethernet service or it
/// reports no address.
pub(crate) async fn derive_identifier(bus: &dyn Bus, prefix: &str) -> Result<String> {
    let services = bus.services().await.inspect_err(|e| {
        error!("Unable to get ethernet service: {e}");
    })?;

    let address = services
        .into_iter()
        .find(|s| s.kind == MediumType::Ethernet)
        .and_then(|s| s.ethernet_address)
        .ok_or_else(|| {
            warn!("No ethernet hardware address to derive the SSID from");
            ConnectionError::AddressUnavailable
        })?;

    Ok(tethering_identifier(prefix, &address))
}
