//! Built-in RDS MySQL operations.
//!
//! Each submodule contributes descriptors for one resource family. A handler
//! run is always: bind → rules → normalize → resource client → mapping.

mod accounts;
mod allow_lists;
mod databases;
mod instances;
mod parameters;
mod vpcs;

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{to_mapping, ResourceClient};
use crate::rules::Rule;
use crate::tools::{ArgumentSet, OperationCatalog, OperationDescriptor, ParamDef};
use crate::types::{Error, Result};

/// Catalog holding every built-in operation.
pub fn builtin_catalog() -> Result<OperationCatalog> {
    let mut catalog = OperationCatalog::new();
    let families = [
        instances::descriptors(),
        accounts::descriptors(),
        databases::descriptors(),
        parameters::descriptors(),
        allow_lists::descriptors(),
        vpcs::descriptors(),
    ];
    for descriptor in families.into_iter().flatten() {
        catalog.register(descriptor)?;
    }
    Ok(catalog)
}

/// Run one operation end to end. The client is never called when binding,
/// a rule or normalization fails.
pub async fn execute<C>(
    descriptor: &OperationDescriptor,
    client: &C,
    arguments: Map<String, Value>,
) -> Result<Map<String, Value>>
where
    C: ResourceClient + ?Sized,
{
    let request = descriptor.prepare(arguments)?;
    debug!(
        operation = descriptor.name,
        action = request.endpoint.action,
        fields = request.payload.len(),
        "Request prepared"
    );
    let response = client.call(request).await?;
    to_mapping(response)
}

// =============================================================================
// Shared argument definitions
// =============================================================================

fn page_number() -> ParamDef {
    ParamDef::int("page_number", "Page number, starting at 1").with_default(1)
}

fn page_size() -> ParamDef {
    ParamDef::int("page_size", "Records per page, 1-1000").with_default(10)
}

const PAGE_RULES: [Rule; 2] = [
    Rule::at_least("page_number", 1),
    Rule::range("page_size", 1, 1000),
];

/// Non-negative count argument, already range-checked by the rules.
fn count(args: &ArgumentSet, field: &str) -> Result<u64> {
    match args.i64(field) {
        Some(n) => u64::try_from(n)
            .map_err(|_| Error::validation(format!("{field} must be at least 0, got {n}"))),
        None => Ok(0),
    }
}
