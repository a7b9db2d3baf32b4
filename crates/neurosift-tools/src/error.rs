//! Error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Failures talking to the remote tool catalog.
///
/// The display text is the message shown to the caller after `API error: `.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (connection refused, timeout, TLS).
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response. `message` is the body's `error` field when present.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body is an `{ "error": ... }` object.
    #[error("{0}")]
    Upstream(String),

    /// Response body did not have the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-2xx response from its status and raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .as_ref()
            .and_then(upstream_error)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        Self::Status { status, message }
    }
}

/// The `error` string of a body shaped `{ "error": "..." }`, if any.
/// An empty string does not count.
pub fn upstream_error(body: &serde_json::Value) -> Option<&str> {
    body.as_object()?
        .get("error")?
        .as_str()
        .filter(|message| !message.is_empty())
}

/// Registry refresh failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to fetch tools: {0}")]
    Fetch(#[from] ApiError),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_prefers_body_error_field() {
        let err = ApiError::from_status(500, r#"{"error": "bad input"}"#);
        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                message: "bad input".to_string()
            }
        );
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn status_error_falls_back_to_status_line() {
        let err = ApiError::from_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "Request failed with status code 502");
    }

    #[test]
    fn empty_error_field_falls_back_to_status_line() {
        let err = ApiError::from_status(500, r#"{"error": ""}"#);
        assert_eq!(err.to_string(), "Request failed with status code 500");
        assert_eq!(upstream_error(&serde_json::json!({"error": ""})), None);
    }

    #[test]
    fn non_string_error_field_is_ignored() {
        let err = ApiError::from_status(400, r#"{"error": {"code": 1}}"#);
        assert_eq!(err.to_string(), "Request failed with status code 400");
    }
}
