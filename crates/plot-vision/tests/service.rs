use std::io::Write;
use std::sync::Mutex;

use mcp::{CallToolParams, JsonRpcError, Server, ToolService};
use plot_vision::{
    ChatCompletionRequest, ChatCompletionResponse, NO_ANALYSIS, PlotVision, VisionApi,
    VisionError, server_info,
};
use serde_json::{Value, json};
use tempfile::NamedTempFile;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

#[derive(Debug)]
struct FakeVision {
    reply: Result<Value, VisionError>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl FakeVision {
    fn replying(reply: Result<Value, VisionError>) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn answering(text: &str) -> Self {
        Self::replying(Ok(json!({
            "choices": [{"message": {"role": "assistant", "content": text}}]
        })))
    }

    fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

impl VisionApi for FakeVision {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, VisionError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        ChatCompletionResponse::from_value(self.reply.clone()?)
    }
}

fn service(api: FakeVision) -> PlotVision<FakeVision> {
    PlotVision::new(api, "openai/gpt-4o")
}

fn png_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(PNG_MAGIC).expect("write png");
    file
}

fn call(name: &str, arguments: Value) -> CallToolParams {
    CallToolParams {
        name: name.to_string(),
        arguments: arguments.as_object().cloned(),
    }
}

fn fault(err: mcp::Error) -> JsonRpcError {
    err.as_fault().cloned().expect("protocol fault")
}

#[tokio::test]
async fn lists_exactly_the_analyze_plot_tool() {
    let service = service(FakeVision::answering("unused"));

    let tools = service.list_tools().await.unwrap();

    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "analyze_plot");
    assert_eq!(tools[0].description, "Analyze a scientific plot using an LLM");
    assert_eq!(service.list_tools().await.unwrap(), tools);
}

#[tokio::test]
async fn unknown_tool_is_method_not_found_without_backend_call() {
    let service = service(FakeVision::answering("unused"));

    let err = service
        .call_tool(call("analyze_table", json!({"image_path": "/tmp/x.png"})))
        .await
        .unwrap_err();
    let fault = fault(err);

    assert_eq!(fault.code, JsonRpcError::METHOD_NOT_FOUND);
    assert_eq!(fault.message, "Unknown tool: analyze_table");
    assert_eq!(service.analyzer().api().call_count(), 0);
}

#[tokio::test]
async fn invalid_arguments_fail_before_any_backend_call() {
    let service = service(FakeVision::answering("unused"));

    let err = service
        .call_tool(call("analyze_plot", json!({"image_path": 7})))
        .await
        .unwrap_err();

    assert_eq!(fault(err).code, JsonRpcError::INVALID_PARAMS);
    assert_eq!(service.analyzer().api().call_count(), 0);
}

#[tokio::test]
async fn successful_analysis_returns_model_text_verbatim() {
    let image = png_file();
    let service = service(FakeVision::answering("A scatter plot of spike rate vs. time."));

    let result = service
        .call_tool(call(
            "analyze_plot",
            json!({
                "image_path": image.path(),
                "additional_instructions": "Mention outliers."
            }),
        ))
        .await
        .unwrap();

    assert!(!result.is_error);
    assert_eq!(result.text_content(), "A scatter plot of spike rate vs. time.");

    let requests = service.analyzer().api().requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let sent = serde_json::to_value(&requests[0]).unwrap();
    assert_eq!(sent["model"], json!("openai/gpt-4o"));
    assert_eq!(sent["max_tokens"], json!(1000));
    assert!(
        sent["messages"][0]["content"]
            .as_str()
            .unwrap()
            .ends_with("\nMention outliers.")
    );
    assert_eq!(
        sent["messages"][1]["content"][1]["image_url"]["url"],
        json!("data:image/png;base64,iVBORw==")
    );
}

#[tokio::test]
async fn missing_file_is_recoverable_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.png");
    let service = service(FakeVision::answering("unused"));

    let result = service
        .call_tool(call("analyze_plot", json!({"image_path": missing})))
        .await
        .unwrap();

    assert!(result.is_error);
    let text = result.text_content();
    assert!(text.starts_with("Error analyzing plot: "), "{text}");
    assert!(text.contains("nope.png"), "{text}");
    assert_eq!(service.analyzer().api().call_count(), 0);
}

#[tokio::test]
async fn empty_choices_fall_back_to_placeholder() {
    let image = png_file();
    let service = service(FakeVision::replying(Ok(json!({"choices": []}))));

    let result = service
        .call_tool(call("analyze_plot", json!({"image_path": image.path()})))
        .await
        .unwrap();

    assert!(!result.is_error);
    assert_eq!(result.text_content(), NO_ANALYSIS);
    assert_eq!(result.text_content(), "No analysis generated");
}

#[tokio::test]
async fn gateway_error_body_on_success_status_is_recoverable_error() {
    let image = png_file();
    let service = service(FakeVision::replying(Ok(json!({
        "error": {"message": "Provider returned error", "code": 502}
    }))));

    let result = service
        .call_tool(call("analyze_plot", json!({"image_path": image.path()})))
        .await
        .unwrap();

    assert!(result.is_error);
    assert_eq!(
        result.text_content(),
        "Error analyzing plot: LLM gateway error: Provider returned error"
    );
}

#[tokio::test]
async fn gateway_error_is_recoverable() {
    let image = png_file();
    let service = service(FakeVision::replying(Err(VisionError::Status {
        status: 401,
        message: "No auth credentials found".to_string(),
    })));

    let result = service
        .call_tool(call("analyze_plot", json!({"image_path": image.path()})))
        .await
        .unwrap();

    assert!(result.is_error);
    assert_eq!(
        result.text_content(),
        "Error analyzing plot: LLM gateway returned 401: No auth credentials found"
    );
}

#[tokio::test]
async fn serves_analysis_over_the_wire() {
    let image = png_file();
    let server = Server::new(server_info(), service(FakeVision::answering("A histogram.")));

    let analyze = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {"name": "analyze_plot", "arguments": {"image_path": image.path()}}
    });
    let input = format!(
        "{}\n{}\n{}\n",
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        analyze,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"analyze_plot","arguments":{}}}"#,
    );
    let mut out = Vec::new();
    server.serve(input.as_bytes(), &mut out).await.unwrap();

    let responses: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(responses.len(), 3);
    assert_eq!(
        responses[0]["result"]["serverInfo"],
        json!({"name": "plot-vision", "version": "0.1.0"})
    );
    assert_eq!(
        responses[1]["result"],
        json!({"content": [{"type": "text", "text": "A histogram."}]})
    );
    assert_eq!(responses[2]["error"]["code"], json!(-32602));
}
