//! Constants for the ConnMan and wpantund D-Bus APIs.
//!
//! Bus names, object paths, property keys and the defaults used when the
//! caller does not override them through [`GatewayConfig`](crate::GatewayConfig).

/// ConnMan bus name and agent object.
pub mod connman {
    pub const SERVICE: &str = "net.connman";

    /// Default path our authentication agent is served under.
    pub const AGENT_PATH: &str = "/net/connman/netsetup/agent";
}

/// ConnMan error names that carry no failure for idempotent requests.
pub mod connman_errors {
    pub const ALREADY_CONNECTED: &str = "net.connman.Error.AlreadyConnected";
    pub const ALREADY_ENABLED: &str = "net.connman.Error.AlreadyEnabled";
    pub const ALREADY_DISABLED: &str = "net.connman.Error.AlreadyDisabled";
}

/// Property keys on `net.connman.Technology` and `net.connman.Service` objects.
pub mod property {
    pub const NAME: &str = "Name";
    pub const TYPE: &str = "Type";
    pub const POWERED: &str = "Powered";
    pub const CONNECTED: &str = "Connected";
    pub const STATE: &str = "State";
    pub const STRENGTH: &str = "Strength";
    pub const SECURITY: &str = "Security";
    pub const ETHERNET: &str = "Ethernet";
    pub const ADDRESS: &str = "Address";
    pub const TETHERING: &str = "Tethering";
    pub const TETHERING_IDENTIFIER: &str = "TetheringIdentifier";
    pub const TETHERING_PASSPHRASE: &str = "TetheringPassphrase";
}

/// Agent `RequestInput` field names.
pub mod agent_field {
    pub const PASSPHRASE: &str = "Passphrase";
}

/// wpantund bus name and status keys.
pub mod wpantund {
    pub const SERVICE: &str = "com.nestlabs.WPANTunnelDriver";

    pub const NCP_STATE: &str = "NCP:State";
    pub const NCP_CHANNEL: &str = "NCP:Channel";
    pub const NODE_TYPE: &str = "Network:NodeType";
    pub const NETWORK_NAME: &str = "Network:Name";
    pub const PAN_ID: &str = "Network:PANID";
    pub const XPAN_ID: &str = "Network:XPANID";
    pub const NETWORK_KEY: &str = "Network:Key";
    pub const MESH_LOCAL_ADDRESS: &str = "IPv6:MeshLocalAddress";

    pub const STATE_ASSOCIATED: &str = "associated";
}

/// Tethering defaults for the gateway access point.
pub mod tethering {
    pub const SSID_PREFIX: &str = "knot_gw";
    pub const DEFAULT_PASSPHRASE: &str = "knotNetworkOfThings";

    /// WPA2 passphrase bounds; a 64 character value must be a raw hex key.
    pub const PASSPHRASE_MIN_LEN: usize = 8;
    pub const PASSPHRASE_MAX_LEN: usize = 63;
    pub const RAW_KEY_LEN: usize = 64;
}

/// Timeout constants for signal-based waiting.
pub mod timeouts {
    use std::time::Duration;

    /// How long a scan waits for `ServicesChanged` before settling with the
    /// current directory view (5 seconds).
    const SCAN_SETTLE_TIMEOUT_MS: u64 = 5000;

    /// Returns the default scan settle timeout.
    pub fn scan_settle_timeout() -> Duration {
        Duration::from_millis(SCAN_SETTLE_TIMEOUT_MS)
    }
}
