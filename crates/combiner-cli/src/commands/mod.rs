//! CLI command implementations.

pub mod pack;
pub mod patch;
pub mod unpack;
