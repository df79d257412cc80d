//! D-Bus proxy and interface definitions.
//!
//! Low-level `zbus` bindings for ConnMan (`net.connman`) and wpantund
//! (`com.nestlabs.WPANTunnelDriver`) on the system bus, plus the agent
//! object ConnMan calls back into for credentials.
//!
//! # ConnMan D-Bus Structure
//!
//! - `/` - Manager object (technologies, services, agent registration)
//! - `/net/connman/technology/*` - Technology objects
//! - `/net/connman/service/*` - Service objects

mod agent;
mod manager;
mod service;
mod technology;
mod wpan;

pub(crate) use agent::AgentInterface;
pub(crate) use manager::ConnmanManagerProxy;
pub(crate) use service::ConnmanServiceProxy;
pub(crate) use technology::ConnmanTechnologyProxy;
pub(crate) use wpan::WpanProxy;
