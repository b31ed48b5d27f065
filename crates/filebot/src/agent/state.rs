//! Agent configuration, turn phases and errors

use std::time::Duration;

use llm_core::{ChatOptions, Config, LlmError};

use crate::prompt::SYSTEM_PROMPT;

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model to use
    pub model: String,
    /// Instructions placed before the history on every request
    pub system_prompt: String,
    /// Requests that carry the tool catalog before a final tool-less request
    pub max_tool_rounds: usize,
    /// Query used when the inbound text is empty
    pub default_query: String,
    /// Sampling options forwarded to the model
    pub options: ChatOptions,
    /// History size at which old exchanges are evicted; `None` keeps everything
    pub context_budget_chars: Option<usize>,
    /// Sessions unused for this long are dropped; `None` keeps them all
    pub session_idle: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-oss:20b".to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tool_rounds: 1,
            default_query: "Hello".to_string(),
            options: ChatOptions::default(),
            context_budget_chars: None,
            session_idle: None,
        }
    }
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Build from the `[model]` and `[agent]` sections of filebot.toml
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.name.clone(),
            max_tool_rounds: config.agent.max_tool_rounds.max(1),
            default_query: config.agent.default_query.clone(),
            options: ChatOptions {
                temperature: config.model.temperature,
                num_ctx: config.model.num_ctx,
            },
            context_budget_chars: config.agent.context_budget_chars,
            session_idle: config.session_idle(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// At least one round; the first request always carries the catalog
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds.max(1);
        self
    }

    pub fn with_context_budget(mut self, chars: Option<usize>) -> Self {
        self.context_budget_chars = chars;
        self
    }

    pub fn with_session_idle(mut self, idle: Option<Duration>) -> Self {
        self.session_idle = idle;
        self
    }
}

/// Where a turn is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    AwaitingFirstResponse,
    ExecutingTools,
    AwaitingFinalResponse,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnPhase::Idle => write!(f, "idle"),
            TurnPhase::AwaitingFirstResponse => write!(f, "awaiting_first_response"),
            TurnPhase::ExecutingTools => write!(f, "executing_tools"),
            TurnPhase::AwaitingFinalResponse => write!(f, "awaiting_final_response"),
        }
    }
}

/// Why a turn could not produce an answer
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("model request failed while {phase}: {source}")]
    Model {
        phase: TurnPhase,
        #[source]
        source: LlmError,
    },
}

impl AgentError {
    pub fn phase(&self) -> TurnPhase {
        match self {
            AgentError::Model { phase, .. } => *phase,
        }
    }
}
