//! filebot: chat assistant for a folder of files, backed by a local Ollama model
//!
//! A transport hands [`agent::AgentLoop::handle_turn`] a plain-text query; the
//! loop asks the model, runs any file tools it requests, and returns the reply.

pub mod agent;
pub mod conversation;
pub mod files;
pub mod prompt;
pub mod tools;
pub mod transport;

pub use agent::{AgentConfig, AgentError, AgentLoop, TurnPhase, APOLOGY};
pub use conversation::{ConversationState, SessionStore, Turn, DEFAULT_SESSION};
pub use files::FileStore;
pub use tools::builtin::create_default_registry;
pub use tools::registry::ToolRegistry;
pub use tools::{Tool, ToolCallRequest, ToolResult};
