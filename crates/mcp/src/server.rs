//! Stdio transport: reads requests line by line and dispatches them to a
//! [`ToolService`].

use std::future::Future;

use serde_json::Value;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, RequestId, ServerInfo, Tool,
};

/// Maximum size of a single inbound message (1MB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// The two operations a tool server exposes to the client.
///
/// Returning [`Error::Fault`] answers the request with a JSON-RPC error.
/// Any other error stops the serve loop.
pub trait ToolService: Send + Sync {
    /// Tools currently advertised.
    fn list_tools(&self) -> impl Future<Output = Result<Vec<Tool>>> + Send;

    /// Execute one tool call.
    fn call_tool(&self, params: CallToolParams)
    -> impl Future<Output = Result<CallToolResult>> + Send;
}

/// A tool server bound to a service implementation.
pub struct Server<S> {
    info: ServerInfo,
    service: S,
}

impl<S: ToolService> Server<S> {
    pub fn new(info: ServerInfo, service: S) -> Self {
        Self { info, service }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Serve on the process's stdin/stdout until end of input or Ctrl-C.
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        info!(server = %self.info.name, "{} MCP server running on stdio", self.info.name);

        tokio::select! {
            result = self.serve(stdin, stdout) => result,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupt received, closing transport");
                Ok(())
            }
        }
    }

    /// Serve newline-delimited JSON-RPC over an arbitrary reader/writer pair.
    ///
    /// Requests are handled one at a time, in arrival order. A malformed or
    /// oversized line is answered with an error and the loop moves on.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let response = match read_frame(&mut reader, &mut buf).await? {
                Frame::Closed => break,
                Frame::Oversized => {
                    warn!(max = MAX_MESSAGE_SIZE, "dropping oversized message");
                    let fault = JsonRpcError::invalid_request(format!(
                        "message too large (max {MAX_MESSAGE_SIZE} bytes)"
                    ));
                    Some(JsonRpcResponse::failure(None, fault))
                }
                Frame::Line => {
                    let line = buf.trim_ascii();
                    if line.is_empty() {
                        continue;
                    }
                    self.handle_line(line).await?
                }
            };

            let Some(response) = response else {
                continue;
            };

            let mut json = serde_json::to_string(&response)?;
            json.push('\n');
            writer.write_all(json.as_bytes()).await?;
            writer.flush().await?;
        }

        debug!("input closed");
        Ok(())
    }

    async fn handle_line(&self, line: &[u8]) -> Result<Option<JsonRpcResponse>> {
        let value = match serde_json::from_slice::<Value>(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                let fault = JsonRpcError::parse_error(format!("Parse error: {e}"));
                return Ok(Some(JsonRpcResponse::failure(None, fault)));
            }
        };

        // Echo the id back when it is readable even if the rest is not.
        let id = value
            .get("id")
            .cloned()
            .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "malformed request");
                let fault = JsonRpcError::invalid_request(format!("Invalid request: {e}"));
                Ok(Some(JsonRpcResponse::failure(id, fault)))
            }
        }
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Result<Option<JsonRpcResponse>> {
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return Ok(None);
        }

        debug!(method = %request.method, id = ?request.id, "request");
        let id = request.id;

        match self.dispatch(&request.method, request.params).await {
            Ok(result) => Ok(Some(JsonRpcResponse::success(id, result))),
            Err(Error::Fault(fault)) => {
                warn!(method = %request.method, %fault, "request failed");
                Ok(Some(JsonRpcResponse::failure(id, fault)))
            }
            Err(e) => Err(e),
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value> {
        match method {
            "initialize" => Ok(serde_json::to_value(InitializeResult::new(
                self.info.clone(),
            ))?),
            "ping" => Ok(Value::Object(Default::default())),
            "tools/list" => {
                let tools = self.service.list_tools().await?;
                Ok(serde_json::to_value(ListToolsResult { tools })?)
            }
            "tools/call" => {
                let params = parse_call_params(params)?;
                let result = self.service.call_tool(params).await?;
                Ok(serde_json::to_value(result)?)
            }
            other => Err(JsonRpcError::method_not_found(format!("Method not found: {other}")).into()),
        }
    }
}

enum Frame {
    Line,
    Oversized,
    Closed,
}

/// Read one newline-terminated message into `buf`, never buffering more than
/// [`MAX_MESSAGE_SIZE`] bytes of it.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_MESSAGE_SIZE as u64 + 1;
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;

    if read == 0 {
        return Ok(Frame::Closed);
    }
    if buf.last() == Some(&b'\n') || read <= MAX_MESSAGE_SIZE {
        return Ok(Frame::Line);
    }

    buf.clear();
    skip_line(reader).await?;
    Ok(Frame::Oversized)
}

/// Consume input up to and including the next newline without keeping it.
async fn skip_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, done) = {
            let chunk = reader.fill_buf().await?;
            match chunk.iter().position(|&b| b == b'\n') {
                Some(end) => (end + 1, true),
                None => (chunk.len(), chunk.is_empty()),
            }
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

fn parse_call_params(params: Option<Value>) -> Result<CallToolParams> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("missing tools/call params"))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("invalid tools/call params: {e}")).into())
}
