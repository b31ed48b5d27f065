//! Agent loop that turns one user query into model requests and tool calls

mod agent_loop;
mod state;

pub use agent_loop::{AgentLoop, APOLOGY};
pub use state::{AgentConfig, AgentError, TurnPhase};
