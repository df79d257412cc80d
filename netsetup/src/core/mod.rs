//! Core orchestration logic.
//!
//! Technology control, service lookup, scan sessions, the connect flow and
//! the credentials agent. Everything here talks to ConnMan only through the
//! [`Bus`](crate::bus::Bus) trait.

pub(crate) mod agent;
pub(crate) mod connect;
pub(crate) mod directory;
pub(crate) mod scan;
pub(crate) mod technology;
