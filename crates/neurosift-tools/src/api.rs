//! Remote tool catalog: descriptor types, the [`ToolsApi`] seam and its
//! reqwest implementation.

use std::collections::BTreeMap;
use std::future::Future;

use mcp::Tool;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, upstream_error};

/// A tool as published by the remote catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: ParameterSchema,
}

/// JSON-schema object describing a tool's arguments.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParameterSchema {
    #[serde(rename = "type", default = "object_type")]
    pub kind: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, ParameterProperty>,
    /// Schema keywords not modelled above, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self {
            kind: object_type(),
            required: Vec::new(),
            properties: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

fn object_type() -> String {
    "object".to_string()
}

/// One argument field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParameterProperty {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<ToolDescriptor> for Tool {
    fn from(descriptor: ToolDescriptor) -> Self {
        Self {
            name: descriptor.name,
            description: descriptor.description,
            input_schema: serde_json::to_value(descriptor.parameters).unwrap_or(Value::Null),
        }
    }
}

/// HTTP boundary to the tool catalog.
pub trait ToolsApi: Send + Sync {
    /// `GET /tools`.
    fn fetch_tools(&self) -> impl Future<Output = Result<Vec<ToolDescriptor>, ApiError>> + Send;

    /// `POST /<tool>` with the arguments as JSON body; returns the response body.
    fn invoke(
        &self,
        tool: &str,
        arguments: &Map<String, Value>,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// [`ToolsApi`] over reqwest.
#[derive(Debug, Clone)]
pub struct HttpToolsApi {
    client: Client,
    base_url: String,
}

impl HttpToolsApi {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.api_url.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        Ok(parse_body(body))
    }
}

/// JSON body if it parses, otherwise the raw text as a JSON string.
fn parse_body(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

impl ToolsApi for HttpToolsApi {
    async fn fetch_tools(&self) -> Result<Vec<ToolDescriptor>, ApiError> {
        let url = self.endpoint("tools");
        debug!(%url, "fetching tool catalog");

        let body = self.send(self.client.get(url)).await?;
        if let Some(message) = upstream_error(&body) {
            return Err(ApiError::Upstream(message.to_string()));
        }
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn invoke(&self, tool: &str, arguments: &Map<String, Value>) -> Result<Value, ApiError> {
        let url = self.endpoint(tool);
        debug!(%url, "invoking tool");

        let body = self.send(self.client.post(url).json(arguments)).await?;
        if let Some(message) = upstream_error(&body) {
            return Err(ApiError::Upstream(message.to_string()));
        }
        Ok(body)
    }
}
