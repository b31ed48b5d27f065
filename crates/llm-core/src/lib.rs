//! llm-core: Shared library for talking to a local Ollama service
//!
//! Provides:
//! - Configuration loading (filebot.toml)
//! - Ollama `/api/chat` client with tool calling

pub mod config;
pub mod ollama;

pub use config::Config;
pub use ollama::{
    ChatMessageWithTools, ChatModel, ChatOptions, ChatResponse, FunctionCall,
    FunctionDefinition, LlmError, Model, OllamaClient, OllamaStatus, Role, ToolCall,
    ToolDefinition,
};
