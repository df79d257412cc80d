//! Type definitions and constants.
//!
//! This module contains ConnMan and wpantund constants.

pub(crate) mod constants;
