//! Gateway configuration.

use std::time::Duration;

use crate::types::constants::{connman, tethering, timeouts};

/// Tunables for a [`Gateway`](crate::Gateway).
///
/// # Examples
///
/// ```rust
/// use netsetup::GatewayConfig;
/// use std::time::Duration;
///
/// let config = GatewayConfig::new()
///     .with_scan_timeout(Duration::from_secs(10))
///     .with_ssid_prefix("lab_gw");
///
/// assert_eq!(config.scan_timeout, Duration::from_secs(10));
/// assert_eq!(config.ssid_prefix, "lab_gw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// How long a scan waits for the service list to change before settling
    /// with whatever ConnMan currently reports.
    pub scan_timeout: Duration,
    /// Prefix of the synthesized tethering SSID (`<prefix>_<mac>`).
    pub ssid_prefix: String,
    /// Passphrase advertised while tethering.
    pub tethering_passphrase: String,
    /// Object path the authentication agent is served under.
    pub agent_path: String,
}

impl Default for GatewayConfig {
    /// Defaults:
    /// - `scan_timeout`: 5 seconds
    /// - `ssid_prefix`: `knot_gw`
    /// - `tethering_passphrase`: `knotNetworkOfThings`
    /// - `agent_path`: `/net/connman/netsetup/agent`
    fn default() -> Self {
        Self {
            scan_timeout: timeouts::scan_settle_timeout(),
            ssid_prefix: tethering::SSID_PREFIX.to_string(),
            tethering_passphrase: tethering::DEFAULT_PASSPHRASE.to_string(),
            agent_path: connman::AGENT_PATH.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_ssid_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ssid_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_tethering_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.tethering_passphrase = passphrase.into();
        self
    }

    #[must_use]
    pub fn with_agent_path(mut self, path: impl Into<String>) -> Self {
        self.agent_path = path.into();
        self
    }
}
