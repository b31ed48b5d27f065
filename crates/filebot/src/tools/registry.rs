//! Tool registry for managing and dispatching available tools

use std::collections::BTreeMap;
use std::sync::Arc;

use llm_core::ToolDefinition;
use tracing::{info, instrument, warn};

use super::{Tool, ToolCallRequest, ToolResult};

/// Result reported to the model when it asks for a tool that does not exist
pub const UNKNOWN_TOOL: &str = "Unknown tool";

/// Registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all registered tool names, sorted
    pub fn list_names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Tool definitions for the model request, in name order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Run one tool call. Never fails; problems come back as [`ToolResult::Failure`].
    #[instrument(skip(self, request), fields(tool = %request.name, id = %request.id))]
    pub async fn dispatch(&self, request: &ToolCallRequest) -> ToolResult {
        let Some(tool) = self.get(&request.name) else {
            warn!("Tool not found");
            return ToolResult::failure(UNKNOWN_TOOL);
        };

        if let Err(problem) = tool.parameters_schema().validate(&request.arguments) {
            warn!(%problem, "Rejected tool arguments");
            return ToolResult::Failure(problem);
        }

        let result = tool.execute(&request.arguments).await;
        if result.is_failure() {
            warn!(error = %result.to_content(), "Tool execution failed");
        } else {
            info!(output_len = result.to_content().len(), "Tool executed successfully");
        }
        result
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ParameterProperty, ParameterSchema};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes input"
        }

        fn parameters_schema(&self) -> ParameterSchema {
            ParameterSchema::new().with_required("text", ParameterProperty::string("Text to echo"))
        }

        async fn execute(&self, args: &Value) -> ToolResult {
            let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("empty");
            ToolResult::text(text)
        }
    }

    fn request(name: &str, arguments: Value) -> ToolCallRequest {
        ToolCallRequest {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.list_names(), vec!["echo"]);
    }

    #[test]
    fn test_registry_definitions() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].tool_type, "function");
        assert_eq!(defs[0].function.name, "echo");
        assert_eq!(defs[0].function.parameters["required"], json!(["text"]));
    }

    #[tokio::test]
    async fn test_dispatch_known_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry.dispatch(&request("echo", json!({"text": "hello"}))).await;
        assert_eq!(result, ToolResult::text("hello"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::new();

        let result = registry.dispatch(&request("bogus", json!({}))).await;
        assert_eq!(result, ToolResult::failure("Unknown tool"));
        assert_eq!(result.to_content(), "\"Unknown tool\"");
    }

    #[tokio::test]
    async fn test_dispatch_validates_before_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry.dispatch(&request("echo", json!({}))).await;
        assert_eq!(result, ToolResult::failure("Missing required parameter: text"));
    }
}
