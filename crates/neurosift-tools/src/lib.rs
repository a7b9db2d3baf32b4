//! MCP server exposing the Neurosift agent tool catalog.
//!
//! The catalog is fetched from a remote API on every `tools/list`, and each
//! `tools/call` is forwarded to `POST <api>/<tool name>` with the call
//! arguments as JSON body.

pub mod api;
pub mod config;
mod error;
pub mod registry;
mod service;

pub use api::{HttpToolsApi, ParameterProperty, ParameterSchema, ToolDescriptor, ToolsApi};
pub use config::{API_URL_ENV, Config, ConfigError, DEFAULT_API_URL};
pub use error::{ApiError, Error, RegistryError, Result};
pub use registry::ToolRegistry;
pub use service::{NeurosiftTools, SERVER_NAME, SERVER_VERSION, server_info};
