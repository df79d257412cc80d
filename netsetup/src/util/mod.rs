//! Internal helpers.

pub(crate) mod one_shot;
pub(crate) mod utils;
