//! MCP (Model Context Protocol) server library.
//!
//! This crate provides the server side of the tool-invocation protocol over
//! stdio: JSON-RPC message types, the [`ToolService`] trait a tool server
//! implements, and the [`Server`] loop that drives it.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{CallToolParams, CallToolResult, JsonRpcError, Server, ServerInfo, Tool, ToolService};
//!
//! struct Hello;
//!
//! impl ToolService for Hello {
//!     async fn list_tools(&self) -> mcp::Result<Vec<Tool>> {
//!         Ok(vec![Tool {
//!             name: "hello".to_string(),
//!             description: "Say hello".to_string(),
//!             input_schema: serde_json::json!({"type": "object"}),
//!         }])
//!     }
//!
//!     async fn call_tool(&self, params: CallToolParams) -> mcp::Result<CallToolResult> {
//!         match params.name.as_str() {
//!             "hello" => Ok(CallToolResult::text("hello")),
//!             other => Err(JsonRpcError::method_not_found(format!("Unknown tool: {other}")).into()),
//!         }
//!     }
//! }
//!
//! # async fn example() -> mcp::Result<()> {
//! let server = Server::new(ServerInfo::new("hello", "0.1.0"), Hello);
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod protocol;
mod server;

pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, RequestId, ServerCapabilities,
    ServerInfo, Tool, ToolContent,
};
pub use server::{MAX_MESSAGE_SIZE, Server, ToolService};
