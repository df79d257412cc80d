//! Public API module.
//!
//! This module contains the high-level user-facing API for the `netsetup` crate.

pub mod config;
pub mod gateway;
pub mod models;
