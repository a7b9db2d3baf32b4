//! MCP server that describes scientific plots with a vision LLM.
//!
//! A single tool, `analyze_plot`, reads a PNG from local disk and asks a
//! multimodal model (via OpenRouter) for a detailed description of it.

pub mod analyze;
pub mod config;
mod error;
mod service;
pub mod vision;

pub use analyze::{AnalyzePlotArgs, MAX_TOKENS, NO_ANALYSIS, PlotAnalyzer, TOOL_NAME, analyze_plot_tool};
pub use config::{API_KEY_ENV, Config, ConfigError};
pub use error::{AnalysisError, Error, Result, VisionError};
pub use service::{PlotVision, SERVER_NAME, SERVER_VERSION, server_info};
pub use vision::{ChatCompletionRequest, ChatCompletionResponse, OpenRouterClient, VisionApi};
