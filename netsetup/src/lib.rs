//! Network setup for IoT gateways over ConnMan.
//!
//! This crate drives a gateway's Wi-Fi radio through ConnMan's D-Bus API:
//!
//! - Scanning for access points and listing Wi-Fi services
//! - Connecting to a WPA-PSK network by name
//! - Advertising the gateway's own access point (tethering)
//! - Mirroring the Thread (WPAN) interface status from wpantund
//!
//! # Example
//!
//! ```no_run
//! use netsetup::Gateway;
//!
//! # async fn example() -> netsetup::Result<()> {
//! let gw = Gateway::new().await?;
//!
//! // Scan, then list what ConnMan sees
//! for svc in gw.scan().await? {
//!     println!("{} ({}%)", svc.name, svc.strength.unwrap_or(0));
//! }
//!
//! // Join a network; the passphrase is handed to ConnMan by our agent
//! gw.connect("MyNetwork", "password123").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, ConnectionError>`. Listing and lookup
//! never fail on a missing ConnMan; they log and return an empty result.
//! Best-effort steps such as turning tethering off before a scan log their
//! failure and carry on.
//!
//! # Signal-Based Scanning
//!
//! A scan does not sleep for a fixed time. It subscribes to ConnMan's
//! `ServicesChanged` signal before requesting the scan and settles on the
//! first delivery, falling back to a timeout (5 seconds by default, see
//! [`GatewayConfig`]) so it never hangs.
//!
//! # Testing
//!
//! The orchestration only depends on the [`Bus`] trait. [`ConnmanBus`] is
//! the system-bus implementation; tests plug in their own.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod dbus;
mod monitoring;
mod types;
mod util;

// Public API modules
pub mod api;
pub mod bus;

// Re-exported public API
pub use api::config::GatewayConfig;
pub use api::gateway::Gateway;
pub use api::models::{
    ConnectionError, Credentials, MediumType, Service, ServiceState, Technology,
    TechnologyProperty, WpanStatus,
};
pub use bus::{Bus, ConnmanBus, ServiceChanges};
pub use crate::core::agent::Agent;
pub use crate::monitoring::wpan::WpanMonitor;

/// A specialized `Result` type for network operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;
