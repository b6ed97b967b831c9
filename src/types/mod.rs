//! Core types for the tool server.
//!
//! - **Errors**: application error types with thiserror derives
//! - **Config**: process-wide configuration (region, endpoint, credentials)

mod config;
mod errors;

pub use config::{ClientConfig, Config, Credentials, ServerConfig};
pub use errors::{Error, RemoteError, Result};
