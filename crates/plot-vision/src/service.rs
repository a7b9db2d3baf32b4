//! Dispatcher: the [`ToolService`] exposed over MCP.

use mcp::{CallToolParams, CallToolResult, JsonRpcError, ServerInfo, Tool, ToolService};
use tracing::warn;

use crate::analyze::{AnalyzePlotArgs, PlotAnalyzer, analyze_plot_tool};
use crate::vision::VisionApi;

pub const SERVER_NAME: &str = "plot-vision";
pub const SERVER_VERSION: &str = "0.1.0";

pub fn server_info() -> ServerInfo {
    ServerInfo::new(SERVER_NAME, SERVER_VERSION)
}

/// Serves the fixed `analyze_plot` tool.
pub struct PlotVision<V> {
    tools: Vec<Tool>,
    analyzer: PlotAnalyzer<V>,
}

impl<V: VisionApi> PlotVision<V> {
    pub fn new(api: V, model: impl Into<String>) -> Self {
        Self {
            tools: vec![analyze_plot_tool()],
            analyzer: PlotAnalyzer::new(api, model),
        }
    }

    pub fn analyzer(&self) -> &PlotAnalyzer<V> {
        &self.analyzer
    }
}

impl<V: VisionApi> ToolService for PlotVision<V> {
    async fn list_tools(&self) -> mcp::Result<Vec<Tool>> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, params: CallToolParams) -> mcp::Result<CallToolResult> {
        if !self.tools.iter().any(|t| t.name == params.name) {
            return Err(JsonRpcError::method_not_found(format!("Unknown tool: {}", params.name)).into());
        }

        let args = AnalyzePlotArgs::from_arguments(params.arguments.as_ref())?;

        match self.analyzer.analyze(&args).await {
            Ok(text) => Ok(CallToolResult::text(text)),
            Err(e) => {
                warn!(path = %args.image_path.display(), error = %e, "plot analysis failed");
                Ok(CallToolResult::error(format!("Error analyzing plot: {e}")))
            }
        }
    }
}
