//! # RDS MySQL MCP - Tool server for managed MySQL
//!
//! Exposes RDS MySQL management operations as MCP tools:
//! - Instances: listing, detail, minor versions, rename, creation
//! - Accounts and databases
//! - Parameter templates
//! - Allow lists and VPC lookup
//!
//! ## Architecture
//!
//! Every invocation is one sequential pipeline over shared read-only state:
//! ```text
//!   transport → Dispatcher → OperationDescriptor
//!                              ├─ bind (types, unknown args, defaults)
//!                              ├─ rules (first failure aborts)
//!                              ├─ normalize (wire payload)
//!                              └─ ResourceClient::call → mapping
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod dispatch;
pub mod normalize;
pub mod operations;
pub mod rules;
pub mod tools;
pub mod types;

#[cfg(feature = "mcp-server")]
pub mod server;

// Internal utilities
pub mod observability;

pub use client::{IntoMapping, PreparedRequest, ResourceClient, VolcengineClient};
pub use dispatch::Dispatcher;
pub use types::{Config, Error, Result};
