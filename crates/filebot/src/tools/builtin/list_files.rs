//! Directory listing tool

use async_trait::async_trait;
use serde_json::Value;

use crate::files::FileStore;
use crate::tools::{ParameterSchema, Tool, ToolResult};

/// Lists every entry in the file store
pub struct ListFilesTool {
    store: FileStore,
}

impl ListFilesTool {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List all files in the Files folder"
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new()
    }

    async fn execute(&self, _args: &Value) -> ToolResult {
        match self.store.list_entries() {
            Ok(names) => ToolResult::Files(names),
            Err(e) => ToolResult::failure(format!("Could not list files: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::ToolRegistry;
    use crate::tools::ToolCallRequest;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_matches_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("roster.txt"), "Alice").unwrap();
        fs::write(temp.path().join("scores.csv"), "a,1").unwrap();

        let tool = ListFilesTool::new(FileStore::new(temp.path()));
        let result = tool.execute(&json!({})).await;

        let mut expected: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        expected.sort();
        assert_eq!(result, ToolResult::Files(expected));
    }

    #[tokio::test]
    async fn test_list_missing_dir_via_dispatch() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Files");

        let mut registry = ToolRegistry::new();
        registry.register(ListFilesTool::new(FileStore::new(&dir)));

        let request = ToolCallRequest {
            id: "1".to_string(),
            name: "list_files".to_string(),
            arguments: json!({}),
        };
        let result = registry.dispatch(&request).await;

        assert_eq!(result, ToolResult::Files(Vec::new()));
        assert_eq!(result.to_content(), "[]");
        assert!(dir.is_dir());
    }
}
