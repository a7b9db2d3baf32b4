//! Error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Failures calling the LLM gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisionError {
    #[error("request to LLM gateway failed: {0}")]
    Transport(String),

    #[error("LLM gateway returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body is an `error` object instead of choices.
    #[error("LLM gateway error: {0}")]
    Upstream(String),

    #[error("invalid LLM gateway response: {0}")]
    Decode(String),
}

/// Failures of a single plot analysis. All of them are reported to the caller
/// as tool output, never as protocol faults.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Vision(#[from] VisionError),
}

/// Top-level service errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mcp(#[from] mcp::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
