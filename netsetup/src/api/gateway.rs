use log::{error, info};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::watch;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::config::GatewayConfig;
use crate::api::models::{MediumType, Service, Technology};
use crate::bus::{Bus, ConnmanBus};
use crate::core::agent::Agent;
use crate::core::connect::connect;
use crate::core::directory::{find_by_name, list_by_medium};
use crate::core::scan::Scanner;
use crate::core::technology::{
    derive_identifier, disable_tethering, enable_tethering, ensure_powered, locate,
};

/// High-level interface to the gateway's network setup.
///
/// This is the main entry point: it owns the credentials agent, the scan
/// session slot, and a handle to ConnMan.
///
/// # Creating an Instance
///
/// ```no_run
/// use netsetup::Gateway;
///
/// # async fn example() -> netsetup::Result<()> {
/// let gw = Gateway::new().await?;
/// # Ok(())
/// # }
/// ```
///
/// # Examples
///
/// ## Scan and connect
///
/// ```no_run
/// use netsetup::Gateway;
///
/// # async fn example() -> netsetup::Result<()> {
/// let gw = Gateway::new().await?;
///
/// for svc in gw.scan().await? {
///     println!("{}: {}%", svc.name, svc.strength.unwrap_or(0));
/// }
///
/// gw.connect("HomeNet", "secret123").await?;
/// # Ok(())
/// # }
/// ```
///
/// ## Tethering
///
/// ```no_run
/// use netsetup::Gateway;
///
/// # async fn example() -> netsetup::Result<()> {
/// let gw = Gateway::new().await?;
///
/// // SSID derived from the Ethernet address, e.g. knot_gw_AA_BB_CC_DD_EE_FF
/// let ssid = gw.enable_tethering(None).await?;
/// println!("Advertising {ssid}");
///
/// gw.disable_tethering().await?;
/// # Ok(())
/// # }
/// ```
///
/// # Concurrency
///
/// `Gateway` is `Clone`; clones share the bus handle, the agent and the scan
/// slot. Only one scan or connect runs at a time across all clones; a second
/// one fails with `ConnectionError::AlreadyInProgress`.
#[derive(Clone)]
pub struct Gateway {
    bus: Arc<dyn Bus>,
    agent: Agent,
    scanner: Scanner,
    config: GatewayConfig,
}

impl Debug for Gateway {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("agent", &self.agent)
            .field("scanner", &self.scanner)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Creates a `Gateway` on the system bus with default configuration.
    pub async fn new() -> Result<Self> {
        Self::with_config(GatewayConfig::default()).await
    }

    /// Creates a `Gateway` on the system bus.
    pub async fn with_config(config: GatewayConfig) -> Result<Self> {
        let bus = ConnmanBus::system().await?;
        Ok(Self::with_bus(Arc::new(bus), config).await)
    }

    /// Creates a `Gateway` over any [`Bus`] implementation.
    ///
    /// The agent is registered here, once. If ConnMan is not running the
    /// failure is logged and the gateway is still returned; operations then
    /// fail with `ServiceUnavailable` until ConnMan appears.
    pub async fn with_bus(bus: Arc<dyn Bus>, config: GatewayConfig) -> Self {
        let agent = Agent::new();
        if let Err(e) = bus.register_agent(&config.agent_path, agent.clone()).await {
            error!("Failed to register agent at {}: {e}", config.agent_path);
        }

        Self {
            bus,
            agent,
            scanner: Scanner::new(config.scan_timeout),
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the credentials agent registered with ConnMan.
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Returns the Wi-Fi technology as ConnMan currently reports it.
    pub async fn wifi_technology(&self) -> Result<Technology> {
        locate(&*self.bus, MediumType::Wifi).await
    }

    /// Powers the Wi-Fi radio on if needed.
    pub async fn enable_wifi(&self) -> Result<()> {
        let wifi = self.wifi_technology().await?;
        ensure_powered(&*self.bus, &wifi.path).await
    }

    /// Starts advertising the gateway access point and returns its SSID.
    ///
    /// Without an explicit `identifier` the SSID is derived from the Ethernet
    /// hardware address and the configured prefix. The passphrase comes from
    /// [`GatewayConfig::tethering_passphrase`].
    ///
    /// # Errors
    ///
    /// - `AddressUnavailable` if the SSID must be derived and no Ethernet
    ///   address is known
    /// - `PropertySetFailed` naming the property that was rejected, either by
    ///   ConnMan or, for a passphrase that is not a valid WPA2 passphrase,
    ///   before anything is written
    pub async fn enable_tethering(&self, identifier: Option<&str>) -> Result<String> {
        let wifi = self.wifi_technology().await?;
        let ssid = match identifier {
            Some(id) => id.to_string(),
            None => derive_identifier(&*self.bus, &self.config.ssid_prefix).await?,
        };

        enable_tethering(
            &*self.bus,
            &wifi.path,
            &ssid,
            &self.config.tethering_passphrase,
        )
        .await?;
        Ok(ssid)
    }

    /// Stops advertising the gateway access point.
    ///
    /// Only locating the Wi-Fi technology can fail; the write itself is best
    /// effort and only logged.
    pub async fn disable_tethering(&self) -> Result<()> {
        let wifi = self.wifi_technology().await?;
        disable_tethering(&*self.bus, &wifi.path).await;
        info!("Tethering disabled");
        Ok(())
    }

    /// Lists Wi-Fi services without scanning.
    pub async fn list_wifi_services(&self) -> Vec<Service> {
        list_by_medium(&*self.bus, &MediumType::Wifi).await
    }

    /// Lists services of one medium without scanning.
    pub async fn list_services(&self, kind: &MediumType) -> Vec<Service> {
        list_by_medium(&*self.bus, kind).await
    }

    /// Returns the path of the service named exactly `name`, if visible.
    pub async fn find_service(&self, kind: &MediumType, name: &str) -> Option<OwnedObjectPath> {
        find_by_name(&*self.bus, kind, name).await
    }

    /// Runs one scan session and returns the Wi-Fi services afterwards.
    ///
    /// Tethering is switched off first, since the radio cannot scan in
    /// access-point mode.
    pub async fn scan(&self) -> Result<Vec<Service>> {
        self.scanner.scan(&*self.bus).await
    }

    /// Scans for and connects to the Wi-Fi network `name`.
    ///
    /// # Errors
    ///
    /// - `ServiceNotFound` if no network of that exact name is visible
    ///   after the scan; no connect is attempted
    /// - `AlreadyInProgress` if another scan or connect is running
    /// - `ConnectFailed` if ConnMan rejects or fails the connect
    pub async fn connect(&self, name: &str, passphrase: &str) -> Result<()> {
        connect(&*self.bus, &self.scanner, &self.agent, name, passphrase).await
    }

    /// Tracks ConnMan restarts until `shutdown` fires.
    ///
    /// Run this in a background task. Each restart drops the cached manager
    /// handle so the next call resolves a fresh one.
    pub async fn monitor_service_owner(&self, shutdown: watch::Receiver<()>) -> Result<()> {
        self.bus.monitor_owner(shutdown).await
    }
}
