//! Demo API server exposing the mock endpoints through the mapper.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
