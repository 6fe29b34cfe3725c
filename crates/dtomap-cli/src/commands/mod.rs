//! CLI command implementations.

pub mod check;
pub mod map;
pub mod serve;
