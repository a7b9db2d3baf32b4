//! MCP error types.

use crate::protocol::JsonRpcError;
use thiserror::Error;

/// Errors raised while serving the protocol.
///
/// [`Error::Fault`] aborts the current request only and is answered with a
/// JSON-RPC error. Every other variant is fatal to the serve loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("JSON-RPC error: {0}")]
    Fault(#[from] JsonRpcError),
}

impl Error {
    /// Returns the protocol fault if this error should be answered, not raised.
    pub fn as_fault(&self) -> Option<&JsonRpcError> {
        match self {
            Error::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
