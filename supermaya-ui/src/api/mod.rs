//! HTTP API
//!
//! Browser implementation of the SuperMaya backend contract.

mod client;

pub use client::{get_api_base, set_api_base, HttpBackend};
