//! Ollama API client

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Ollama service status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OllamaStatus {
    /// Service is running and ready
    Running,
    /// Service is not reachable
    Stopped,
}

/// Model information from Ollama API
#[derive(Debug, Clone, Deserialize)]
pub struct Model {
    pub name: String,
    pub size: u64,
    pub digest: String,
    pub modified_at: String,
    #[serde(default)]
    pub details: ModelDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelDetails {
    pub format: Option<String>,
    pub family: Option<String>,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<Model>,
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A chat message that may carry tool calls (assistant) or a tool result (tool)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageWithTools {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessageWithTools {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Assistant message that requested tool invocations
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::plain(Role::Assistant, content)
        }
    }

    /// Result of a single tool invocation
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(Role::Tool, content)
        }
    }

    /// Tool calls carried by this message, empty if none
    pub fn requested_tools(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation token; Ollama frequently omits it
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default = "empty_arguments", deserialize_with = "deserialize_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(Default::default())
}

/// Some models deliver arguments as a JSON-encoded string instead of an object
fn deserialize_arguments<'de, D>(deserializer: D) -> std::result::Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(raw) => Ok(serde_json::from_str(&raw).unwrap_or(Value::String(raw))),
        Value::Null => Ok(empty_arguments()),
        other => Ok(other),
    }
}

/// Tool definition attached to a chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Always "function"
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of accepted arguments
    pub parameters: Value,
}

/// Sampling options forwarded as `options`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
}

impl ChatOptions {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_ctx.is_none()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessageWithTools],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a ChatOptions>,
}

/// Non-streaming `/api/chat` response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessageWithTools,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Failures at the model-service boundary
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request to model service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response from model service: {0}")]
    InvalidResponse(String),
}

/// Anything that can answer a chat request
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the messages, optionally with a tool catalog, and return the reply
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[ChatMessageWithTools],
        tools: Option<&[ToolDefinition]>,
        options: Option<&ChatOptions>,
    ) -> std::result::Result<ChatResponse, LlmError>;
}

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new client without a request timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, None)
    }

    /// Create a new client, optionally bounding every request
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if Ollama is running
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Get current status
    pub async fn status(&self) -> OllamaStatus {
        if self.health_check().await.unwrap_or(false) {
            OllamaStatus::Running
        } else {
            OllamaStatus::Stopped
        }
    }

    /// List all available models
    pub async fn list_models(&self) -> Result<Vec<Model>> {
        let url = format!("{}/api/tags", self.base_url);

        let resp: TagsResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to connect to Ollama")?
            .json()
            .await
            .context("Failed to parse models response")?;

        Ok(resp.models)
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    #[instrument(skip(self, messages, tools, options), fields(messages = messages.len(), with_tools = tools.is_some()))]
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[ChatMessageWithTools],
        tools: Option<&[ToolDefinition]>,
        options: Option<&ChatOptions>,
    ) -> std::result::Result<ChatResponse, LlmError> {
        let url = format!("{}/api/chat", self.base_url);

        let req = ChatRequest {
            model,
            messages,
            tools,
            stream: false,
            options: options.filter(|o| !o.is_empty()),
        };

        let resp = self.client.post(&url).json(&req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        debug!(
            tool_calls = parsed.message.requested_tools().len(),
            content_len = parsed.message.content.len(),
            prompt_tokens = parsed.prompt_eval_count,
            completion_tokens = parsed.eval_count,
            "Chat response received"
        );

        Ok(parsed)
    }
}

impl Model {
    /// Get human-readable size
    pub fn size_human(&self) -> String {
        let gb = self.size as f64 / (1024.0 * 1024.0 * 1024.0);
        format!("{:.1} GB", gb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_with_tool_calls() {
        let body = json!({
            "model": "gpt-oss:20b",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "read_file", "arguments": {"fileName": "roster.txt"}}}
                ]
            },
            "done": true
        });

        let resp: ChatResponse = serde_json::from_value(body).unwrap();
        let calls = resp.message.requested_tools();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "");
        assert_eq!(calls[0].function.name, "read_file");
        assert_eq!(calls[0].function.arguments["fileName"], "roster.txt");
    }

    #[test]
    fn test_string_arguments_are_decoded() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "call_1",
            "function": {"name": "read_file", "arguments": "{\"fileName\":\"a.txt\"}"}
        }))
        .unwrap();

        assert_eq!(call.function.arguments, json!({"fileName": "a.txt"}));
    }

    #[test]
    fn test_missing_arguments_become_empty_object() {
        let call: ToolCall = serde_json::from_value(json!({
            "function": {"name": "list_files"}
        }))
        .unwrap();

        assert_eq!(call.function.arguments, json!({}));
    }

    #[test]
    fn test_request_omits_tools_when_absent() {
        let messages = vec![ChatMessageWithTools::user("hi")];
        let req = ChatRequest {
            model: "m",
            messages: &messages,
            tools: None,
            stream: false,
            options: None,
        };

        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("options").is_none());
        assert_eq!(value["messages"][0], json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_tool_result_message_shape() {
        let msg = ChatMessageWithTools::tool_result("call_1", "\"hello\"");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"role": "tool", "content": "\"hello\"", "tool_call_id": "call_1"})
        );
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let client = OllamaClient::new("http://127.0.0.1:1");
        assert!(!client.health_check().await.unwrap());
        assert_eq!(client.status().await, OllamaStatus::Stopped);
    }
}
