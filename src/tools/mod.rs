//! Tool infrastructure: operation catalog, argument binding, input schemas.
//!
//! Every tool the server exposes is described by an `OperationDescriptor`;
//! the catalog owns the descriptors, the `ArgumentSet` carries one call's
//! arguments with explicit presence.

pub mod arguments;
pub mod catalog;

pub use arguments::ArgumentSet;
pub use catalog::{Normalizer, OperationCatalog, OperationDescriptor, ParamDef, ParamType};
