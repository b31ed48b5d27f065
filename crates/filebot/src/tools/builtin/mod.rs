//! Built-in tools backed by the file store

mod list_files;
mod read_file;

pub use list_files::ListFilesTool;
pub use read_file::ReadFileTool;

use super::registry::ToolRegistry;
use crate::files::FileStore;

/// Create a registry with the file tools
pub fn create_default_registry(store: FileStore) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(ListFilesTool::new(store.clone()));
    registry.register(ReadFileTool::new(store));

    registry
}
