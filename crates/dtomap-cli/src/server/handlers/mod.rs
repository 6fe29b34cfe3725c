//! API request handlers.

mod catalog;
mod map;
mod order;

pub use catalog::*;
pub use map::*;
pub use order::*;
