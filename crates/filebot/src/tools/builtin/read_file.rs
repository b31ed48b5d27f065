//! File read tool

use async_trait::async_trait;
use serde_json::Value;

use crate::files::FileStore;
use crate::tools::{ParameterProperty, ParameterSchema, Tool, ToolResult};

/// Returns the full text of one entry in the file store
pub struct ReadFileTool {
    store: FileStore,
}

impl ReadFileTool {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a specific file from the Files folder"
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .with_required("fileName", ParameterProperty::string("Name of the file to read"))
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        // Registry dispatch validates this; direct callers get the same message.
        let Some(name) = args.get("fileName").and_then(|v| v.as_str()) else {
            return ToolResult::failure("Missing required parameter: fileName");
        };

        match self.store.read_entry(name) {
            Ok(Some(content)) => ToolResult::Text(content),
            Ok(None) => ToolResult::failure(format!("File \"{}\" not found", name)),
            Err(e) => ToolResult::failure(format!("Could not read file \"{}\": {}", name, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("roster.txt"), "Alice\nBob\n").unwrap();

        let tool = ReadFileTool::new(FileStore::new(temp.path()));
        let result = tool.execute(&json!({"fileName": "roster.txt"})).await;

        assert_eq!(result, ToolResult::text("Alice\nBob\n"));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();

        let tool = ReadFileTool::new(FileStore::new(temp.path()));
        let result = tool.execute(&json!({"fileName": "missing.txt"})).await;

        assert_eq!(result, ToolResult::failure("File \"missing.txt\" not found"));
    }

    #[tokio::test]
    async fn test_read_empty_file_is_text() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("empty.txt"), "").unwrap();

        let tool = ReadFileTool::new(FileStore::new(temp.path()));
        let result = tool.execute(&json!({"fileName": "empty.txt"})).await;

        assert_eq!(result, ToolResult::text(""));
    }

    #[tokio::test]
    async fn test_read_non_utf8_reports_failure() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let tool = ReadFileTool::new(FileStore::new(temp.path()));
        let result = tool.execute(&json!({"fileName": "blob.bin"})).await;

        match result {
            ToolResult::Failure(msg) => assert!(msg.starts_with("Could not read file \"blob.bin\"")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
