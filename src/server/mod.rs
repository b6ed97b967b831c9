//! MCP server adapter: exposes the operation catalog as MCP tools.
//!
//! Tool listing comes straight from the catalog's descriptors; every call is
//! forwarded to the [`Dispatcher`]. Validation and remote failures come back
//! as tool-error results, an unknown tool name as an invalid-params error.

mod transport;

pub use transport::{serve_stdio, serve_streamable_http};

use std::future::Future;
use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData as McpError, Implementation,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::{service::RequestContext, RoleServer, ServerHandler};
use serde_json::Value;

use crate::client::ResourceClient;
use crate::dispatch::Dispatcher;
use crate::tools::OperationCatalog;
use crate::types::Error;

const INSTRUCTIONS: &str = "Manage RDS MySQL instances, accounts, databases, parameter templates \
and allow lists, and look up VPCs. Arguments are validated before any remote call; a rejected \
call reports the violated constraint.";

pub struct RdsMcpServer<C> {
    dispatcher: Dispatcher<C>,
    tools: Arc<Vec<Tool>>,
}

impl<C> Clone for RdsMcpServer<C> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            tools: Arc::clone(&self.tools),
        }
    }
}

impl<C> std::fmt::Debug for RdsMcpServer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdsMcpServer")
            .field("tools", &self.tools.len())
            .finish_non_exhaustive()
    }
}

impl<C: ResourceClient> RdsMcpServer<C> {
    pub fn new(dispatcher: Dispatcher<C>) -> Self {
        let tools = Arc::new(tool_list(dispatcher.catalog()));
        Self { dispatcher, tools }
    }
}

impl<C> RdsMcpServer<C> {
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

/// Render every catalog entry as an MCP tool.
pub fn tool_list(catalog: &OperationCatalog) -> Vec<Tool> {
    catalog
        .list_entries()
        .into_iter()
        .map(|descriptor| {
            Tool::new(
                descriptor.name,
                descriptor.description,
                Arc::new(descriptor.input_schema()),
            )
        })
        .collect()
}

/// Map a dispatch failure onto the MCP surface.
fn error_result(err: Error) -> Result<CallToolResult, McpError> {
    match err {
        Error::NotFound(msg) => Err(McpError::invalid_params(msg, None)),
        other => Ok(CallToolResult::error(vec![Content::text(format!(
            "{}: {}",
            other.code(),
            other
        ))])),
    }
}

impl<C> ServerHandler for RdsMcpServer<C>
where
    C: ResourceClient + 'static,
{
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(
            self.tools.as_ref().clone(),
        )))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let name = request.name.to_string();
            let arguments = request.arguments.unwrap_or_default();
            match self.dispatcher.dispatch(&name, arguments).await {
                Ok(result) => {
                    let text = serde_json::to_string_pretty(&Value::Object(result))
                        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                    Ok(CallToolResult::success(vec![Content::text(text)]))
                }
                Err(err) => error_result(err),
            }
        }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
