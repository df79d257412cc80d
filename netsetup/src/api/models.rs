use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use zvariant::OwnedObjectPath;

use crate::types::constants::{property, wpantund};

/// Network medium reported in ConnMan's `Type` property.
///
/// Technologies and services share the same tag space, so the same enum is
/// used to filter both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediumType {
    /// Wi-Fi radio or access point.
    Wifi,
    /// Wired Ethernet link.
    Ethernet,
    /// Bluetooth PAN.
    Bluetooth,
    /// Cellular modem.
    Cellular,
    /// USB gadget networking.
    Gadget,
    /// Wi-Fi peer-to-peer.
    P2p,
    /// Any tag this crate does not model.
    Other(String),
}

impl From<&str> for MediumType {
    fn from(tag: &str) -> Self {
        match tag {
            "wifi" => Self::Wifi,
            "ethernet" => Self::Ethernet,
            "bluetooth" => Self::Bluetooth,
            "cellular" => Self::Cellular,
            "gadget" => Self::Gadget,
            "p2p" => Self::P2p,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for MediumType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wifi => write!(f, "wifi"),
            Self::Ethernet => write!(f, "ethernet"),
            Self::Bluetooth => write!(f, "bluetooth"),
            Self::Cellular => write!(f, "cellular"),
            Self::Gadget => write!(f, "gadget"),
            Self::P2p => write!(f, "p2p"),
            Self::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// A network medium controller (e.g. the Wi-Fi radio).
///
/// Technologies are re-enumerated on every public operation and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    /// Object path of the `net.connman.Technology` object.
    pub path: OwnedObjectPath,
    /// Human readable name (e.g. "WiFi").
    pub name: String,
    /// Medium this technology controls.
    pub kind: MediumType,
    /// Whether the radio is powered.
    pub powered: bool,
    /// Whether at least one service of this technology is connected.
    pub connected: bool,
    /// Whether access-point mode is active.
    pub tethering: bool,
    /// SSID advertised while tethering, if configured.
    pub tethering_identifier: Option<String>,
}

/// ConnMan service state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceState {
    Idle,
    Failure,
    Association,
    Configuration,
    Ready,
    Disconnect,
    Online,
    Other(String),
}

impl From<&str> for ServiceState {
    fn from(state: &str) -> Self {
        match state {
            "idle" => Self::Idle,
            "failure" => Self::Failure,
            "association" => Self::Association,
            "configuration" => Self::Configuration,
            "ready" => Self::Ready,
            "disconnect" => Self::Disconnect,
            "online" => Self::Online,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for ServiceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Failure => write!(f, "failure"),
            Self::Association => write!(f, "association"),
            Self::Configuration => write!(f, "configuration"),
            Self::Ready => write!(f, "ready"),
            Self::Disconnect => write!(f, "disconnect"),
            Self::Online => write!(f, "online"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One visible network endpoint (access point or wired link).
///
/// Services are transient: they are only referenced for the duration of the
/// call that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Object path of the `net.connman.Service` object.
    pub path: OwnedObjectPath,
    /// Display name (the SSID for Wi-Fi services).
    pub name: String,
    /// Medium the service belongs to.
    pub kind: MediumType,
    /// Current connection state.
    pub state: ServiceState,
    /// Signal strength (0-100) for wireless services.
    pub strength: Option<u8>,
    /// Security methods, e.g. `["psk"]` or `["none"]`.
    pub security: Vec<String>,
    /// Hardware address from the `Ethernet` property dictionary.
    pub ethernet_address: Option<String>,
}

impl Service {
    /// Returns `true` once the service has an IP configuration.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, ServiceState::Ready | ServiceState::Online)
    }

    /// Returns `true` if the service requires a passphrase.
    pub fn is_secured(&self) -> bool {
        self.security.iter().any(|s| s != "none")
    }
}

/// A writable property of a technology object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TechnologyProperty {
    Powered(bool),
    Tethering(bool),
    TetheringIdentifier(String),
    TetheringPassphrase(String),
}

impl TechnologyProperty {
    /// The ConnMan property name this value is written to.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Powered(_) => property::POWERED,
            Self::Tethering(_) => property::TETHERING,
            Self::TetheringIdentifier(_) => property::TETHERING_IDENTIFIER,
            Self::TetheringPassphrase(_) => property::TETHERING_PASSPHRASE,
        }
    }
}

impl Display for TechnologyProperty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Powered(v) | Self::Tethering(v) => write!(f, "{}={v}", self.key()),
            Self::TetheringIdentifier(v) => write!(f, "{}={v}", self.key()),
            // never print the secret
            Self::TetheringPassphrase(_) => write!(f, "{}=<hidden>", self.key()),
        }
    }
}

/// The (network name, passphrase) pair answered by the agent.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub passphrase: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passphrase: passphrase.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("passphrase", &"<hidden>")
            .finish()
    }
}

/// Snapshot of the Thread (WPAN) interface as reported by wpantund.
///
/// Everything except `state` is only populated while associated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpanStatus {
    /// `NCP:State`, empty when wpantund is not running.
    pub state: String,
    pub node_type: String,
    pub network_name: String,
    pub pan_id: u16,
    pub channel: u8,
    pub xpan_id: String,
    pub mesh_ipv6: String,
    /// Network master key as colon separated lowercase hex.
    pub master_key: String,
}

impl WpanStatus {
    /// Returns `true` if the NCP has joined a Thread network.
    pub fn is_associated(&self) -> bool {
        self.state == wpantund::STATE_ASSOCIATED
    }
}

/// Errors that can occur during network operations.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// A standard D-Bus interface call failed.
    #[error("D-Bus error: {0}")]
    Fdo(#[from] zbus::fdo::Error),

    /// ConnMan is not running on the system bus.
    #[error("network management service unavailable")]
    ServiceUnavailable,

    /// No technology of the requested medium was reported.
    #[error("no {0} technology found")]
    TechnologyNotFound(MediumType),

    /// The named network was not present after scanning.
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    /// No Ethernet hardware address to derive the tethering SSID from.
    #[error("no ethernet hardware address available")]
    AddressUnavailable,

    /// ConnMan rejected a configuration write.
    #[error("failed to set {property}: {reason}")]
    PropertySetFailed {
        property: &'static str,
        reason: String,
    },

    /// A scan or connect is already running on this gateway.
    #[error("a scan or connect is already in progress")]
    AlreadyInProgress,

    /// The scan request was rejected.
    #[error("scan failed: {0}")]
    ScanFailed(String),

    /// The connect request was rejected or failed.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// A long-running signal watch ended unexpectedly.
    #[error("monitor stopped: {0}")]
    MonitorStopped(String),
}
