//! The `analyze_plot` tool: argument validation and the analysis call.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mcp::{JsonRpcError, Tool};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::vision::{ChatCompletionRequest, ChatMessage, ContentPart, VisionApi};

pub const TOOL_NAME: &str = "analyze_plot";

/// Upper bound on the completion length.
pub const MAX_TOKENS: u32 = 1000;

/// Returned when the model produced no text.
pub const NO_ANALYSIS: &str = "No analysis generated";

const SYSTEM_PROMPT: &str = "You are an expert at analyzing scientific plots. Your responses will be used by an AI system to understand whether plots are informative and what information they convey.";

const USER_PROMPT: &str =
    "Please provide a very detailed description and analysis of the plot in the image below.";

/// Descriptor advertised by `tools/list`.
pub fn analyze_plot_tool() -> Tool {
    Tool {
        name: TOOL_NAME.to_string(),
        description: "Analyze a scientific plot using an LLM".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "image_path": {
                    "type": "string",
                    "description": "The full path to the PNG image file to analyze. It is important to provide the full path."
                },
                "additional_instructions": {
                    "type": "string",
                    "description": "Additional instructions to include in the system prompt to the LLM (optional)"
                }
            },
            "required": ["image_path"]
        }),
    }
}

/// Validated `analyze_plot` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzePlotArgs {
    pub image_path: PathBuf,
    pub additional_instructions: Option<String>,
}

impl AnalyzePlotArgs {
    /// Check the shape of raw call arguments.
    ///
    /// `image_path` must be a string. `additional_instructions` may be absent
    /// or null, otherwise it must be a string too.
    pub fn from_arguments(arguments: Option<&Map<String, Value>>) -> Result<Self, JsonRpcError> {
        let arguments = arguments.ok_or_else(|| invalid("arguments are required"))?;

        let image_path = match arguments.get("image_path") {
            Some(Value::String(path)) => PathBuf::from(path),
            Some(_) => return Err(invalid("image_path must be a string")),
            None => return Err(invalid("image_path is required")),
        };

        let additional_instructions = match arguments.get("additional_instructions") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => return Err(invalid("additional_instructions must be a string")),
        };

        Ok(Self {
            image_path,
            additional_instructions,
        })
    }

    /// Fixed instructions followed by the caller's own, on a new line.
    pub fn system_prompt(&self) -> String {
        format!(
            "{SYSTEM_PROMPT}\n{}",
            self.additional_instructions.as_deref().unwrap_or_default()
        )
    }
}

fn invalid(reason: &str) -> JsonRpcError {
    JsonRpcError::invalid_params(format!("Invalid {TOOL_NAME} arguments: {reason}"))
}

/// Single-turn request asking `model` to describe the base64 PNG.
pub fn build_request(model: &str, args: &AnalyzePlotArgs, image_base64: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(args.system_prompt()),
            ChatMessage::user(vec![
                ContentPart::text(USER_PROMPT),
                ContentPart::png_base64(image_base64),
            ]),
        ],
        max_tokens: MAX_TOKENS,
    }
}

/// Runs plot analyses against a [`VisionApi`].
pub struct PlotAnalyzer<V> {
    api: V,
    model: String,
}

impl<V: VisionApi> PlotAnalyzer<V> {
    pub fn new(api: V, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
        }
    }

    pub fn api(&self) -> &V {
        &self.api
    }

    /// Read the image, send it to the model and return the analysis text.
    pub async fn analyze(&self, args: &AnalyzePlotArgs) -> Result<String, AnalysisError> {
        let image = read_image(&args.image_path).await?;
        debug!(path = %args.image_path.display(), bytes = image.len(), "image loaded");

        let request = build_request(&self.model, args, &STANDARD.encode(&image));
        let response = self.api.complete(&request).await?;

        let text = response.first_text().unwrap_or(NO_ANALYSIS).to_string();
        info!(path = %args.image_path.display(), chars = text.len(), "plot analyzed");
        Ok(text)
    }
}

async fn read_image(path: &Path) -> Result<Vec<u8>, AnalysisError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| AnalysisError::Read {
            path: path.to_path_buf(),
            source,
        })
}
