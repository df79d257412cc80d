//! Long-running signal watchers.
//!
//! Bus-name owner tracking for ConnMan and wpantund, and the Thread (WPAN)
//! status mirror built on top of it.

pub(crate) mod owner;
pub(crate) mod wpan;
