//! Top-level dispatcher: routes an operation name to its handler.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn, Instrument};

use crate::client::ResourceClient;
use crate::operations;
use crate::tools::OperationCatalog;
use crate::types::{Error, Result};

/// Routes tool invocations to operation handlers.
///
/// Holds only shared read-only state, so one dispatcher serves any number of
/// concurrent invocations.
#[derive(Debug)]
pub struct Dispatcher<C> {
    catalog: Arc<OperationCatalog>,
    client: Arc<C>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: ResourceClient> Dispatcher<C> {
    /// Dispatcher over the built-in operations.
    pub fn new(client: C) -> Result<Self> {
        Ok(Self::with_catalog(operations::builtin_catalog()?, client))
    }

    pub fn with_catalog(catalog: OperationCatalog, client: C) -> Self {
        Self {
            catalog: Arc::new(catalog),
            client: Arc::new(client),
        }
    }

    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Run the named operation. Failures propagate unchanged.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let descriptor = self
            .catalog
            .get(name)
            .ok_or_else(|| Error::not_found(format!("Unknown operation: {}", name)))?;

        let span = tracing::debug_span!("dispatch", operation = name);
        let result = operations::execute(descriptor, self.client.as_ref(), arguments)
            .instrument(span)
            .await;

        match &result {
            Ok(_) => debug!(operation = name, "Operation completed"),
            Err(e) if e.is_validation() => {
                warn!(operation = name, error = %e, "Rejected invalid arguments")
            }
            Err(e) => warn!(operation = name, code = e.code(), error = %e, "Operation failed"),
        }
        result
    }
}
