//! Tool framework for the agent loop
//!
//! Every capability the model may invoke implements [`Tool`] and is looked up
//! by name in a [`registry::ToolRegistry`].

pub mod builtin;
pub mod registry;

use async_trait::async_trait;
use llm_core::{FunctionDefinition, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outcome of a tool invocation, fed back to the model as a tool turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    /// A listing of entry names
    Files(Vec<String>),
    /// Text produced by the tool
    Text(String),
    /// Human-readable description of what went wrong
    Failure(String),
}

impl ToolResult {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn failure(s: impl Into<String>) -> Self {
        Self::Failure(s.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// JSON-serialized value used as the tool turn's content
    pub fn to_content(&self) -> String {
        let value = match self {
            Self::Files(names) => Value::from(names.clone()),
            Self::Text(s) | Self::Failure(s) => Value::String(s.clone()),
        };
        value.to_string()
    }
}

/// Schema for a tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterProperty {
    /// Parameter type (string, number, boolean, array, object)
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
}

impl ParameterProperty {
    fn typed(param_type: &str, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.to_string(),
            description: description.into(),
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::typed("string", description)
    }

    /// Whether `value` has this parameter's declared type
    pub fn accepts(&self, value: &Value) -> bool {
        match self.param_type.as_str() {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        }
    }
}

/// Schema describing tool parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Type is always "object"
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, ParameterProperty>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, prop: ParameterProperty) -> Self {
        self.properties.insert(name.into(), prop);
        self
    }

    pub fn with_required(mut self, name: impl Into<String>, prop: ParameterProperty) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), prop);
        self.required.push(name);
        self
    }

    /// Check arguments against the schema, describing the first problem found.
    ///
    /// Unknown extra arguments are tolerated; models add them often and the
    /// handlers ignore them.
    pub fn validate(&self, args: &Value) -> Result<(), String> {
        let Some(map) = args.as_object() else {
            return Err(format!("Arguments must be an object, got {}", args));
        };

        for name in &self.required {
            if map.get(name).map_or(true, Value::is_null) {
                return Err(format!("Missing required parameter: {}", name));
            }
        }

        for (name, value) in map {
            if let Some(prop) = self.properties.get(name) {
                if !value.is_null() && !prop.accepts(value) {
                    return Err(format!(
                        "Parameter {} must be of type {}",
                        name, prop.param_type
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// A tool invocation as the registry sees it
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    /// Correlation token copied onto the resulting tool turn
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl From<&llm_core::ToolCall> for ToolCallRequest {
    fn from(call: &llm_core::ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            name: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
        }
    }
}

/// The Tool trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model calls the tool by
    fn name(&self) -> &str;

    /// Description sent to the model
    fn description(&self) -> &str;

    fn parameters_schema(&self) -> ParameterSchema;

    /// Run the tool. Failures are reported through [`ToolResult::Failure`].
    async fn execute(&self, args: &Value) -> ToolResult;

    /// Convert to a tool definition for the model request
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: serde_json::to_value(self.parameters_schema())
                    .unwrap_or_else(|_| Value::Object(Default::default())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_schema() -> ParameterSchema {
        ParameterSchema::new()
            .with_required("fileName", ParameterProperty::string("Name of the file"))
    }

    #[test]
    fn test_tool_result_content_is_json() {
        assert_eq!(
            ToolResult::Files(vec!["a.txt".into(), "b.csv".into()]).to_content(),
            r#"["a.txt","b.csv"]"#
        );
        assert_eq!(ToolResult::text("line\n").to_content(), r#""line\n""#);
        assert_eq!(ToolResult::failure("Unknown tool").to_content(), r#""Unknown tool""#);
    }

    #[test]
    fn test_schema_serializes_as_json_schema() {
        let value = serde_json::to_value(read_schema()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {"fileName": {"type": "string", "description": "Name of the file"}},
                "required": ["fileName"]
            })
        );
    }

    #[test]
    fn test_validate_required_and_types() {
        let schema = read_schema();

        assert!(schema.validate(&json!({"fileName": "a.txt"})).is_ok());
        assert!(schema.validate(&json!({"fileName": "a.txt", "extra": 1})).is_ok());

        let missing = schema.validate(&json!({})).unwrap_err();
        assert!(missing.contains("Missing required parameter: fileName"));

        let null = schema.validate(&json!({"fileName": null})).unwrap_err();
        assert!(null.contains("Missing required parameter"));

        let wrong = schema.validate(&json!({"fileName": 42})).unwrap_err();
        assert!(wrong.contains("must be of type string"));

        let not_object = schema.validate(&json!("a.txt")).unwrap_err();
        assert!(not_object.contains("must be an object"));
    }

    #[test]
    fn test_empty_schema_accepts_empty_object() {
        assert!(ParameterSchema::new().validate(&json!({})).is_ok());
    }
}
