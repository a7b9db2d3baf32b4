//! Dispatcher: the [`ToolService`] exposed over MCP.

use std::sync::Arc;

use mcp::{CallToolParams, CallToolResult, JsonRpcError, ServerInfo, Tool, ToolService};
use tracing::{error, warn};

use crate::api::ToolsApi;
use crate::registry::ToolRegistry;

pub const SERVER_NAME: &str = "neurosift-tools";
pub const SERVER_VERSION: &str = "1.0.0";

pub fn server_info() -> ServerInfo {
    ServerInfo::new(SERVER_NAME, SERVER_VERSION)
}

/// Proxies every catalog tool to `POST <api>/<tool>`.
pub struct NeurosiftTools<A> {
    api: Arc<A>,
    registry: ToolRegistry<A>,
}

impl<A: ToolsApi> NeurosiftTools<A> {
    pub fn new(api: A) -> Self {
        Self::from_shared(Arc::new(api))
    }

    pub fn from_shared(api: Arc<A>) -> Self {
        Self {
            registry: ToolRegistry::new(Arc::clone(&api)),
            api,
        }
    }

    pub fn registry(&self) -> &ToolRegistry<A> {
        &self.registry
    }
}

impl<A: ToolsApi> ToolService for NeurosiftTools<A> {
    async fn list_tools(&self) -> mcp::Result<Vec<Tool>> {
        let tools = self.registry.refresh().await.map_err(|e| {
            error!(error = %e, "error fetching tools");
            JsonRpcError::internal_error("Failed to fetch available tools")
        })?;

        Ok(tools.iter().cloned().map(Tool::from).collect())
    }

    async fn call_tool(&self, params: CallToolParams) -> mcp::Result<CallToolResult> {
        let Some(tool) = self.registry.lookup(&params.name).await else {
            return Err(JsonRpcError::method_not_found(format!("Unknown tool: {}", params.name)).into());
        };

        // Arguments are checked by the remote API, which owns the schema.
        let arguments = params.arguments.unwrap_or_default();

        match self.api.invoke(&tool.name, &arguments).await {
            Ok(payload) => Ok(CallToolResult::json(&payload)?),
            Err(e) => {
                warn!(tool = %tool.name, error = %e, "tool call failed");
                Ok(CallToolResult::error(format!("API error: {e}")))
            }
        }
    }
}
