//! Agent loop implementation

use std::collections::HashSet;
use std::sync::Arc;

use llm_core::{ChatMessageWithTools, ChatModel, ToolCall, ToolDefinition};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::conversation::{ConversationState, SessionStore, Turn};
use crate::tools::registry::ToolRegistry;
use crate::tools::ToolCallRequest;
use crate::transport::normalize_query;

use super::state::{AgentConfig, AgentError, TurnPhase};

/// Reply sent to the user when a turn fails
pub const APOLOGY: &str = "Sorry, I had trouble processing that.";

/// The agent loop orchestrator
pub struct AgentLoop {
    model: Arc<dyn ChatModel>,
    registry: ToolRegistry,
    config: AgentConfig,
    sessions: SessionStore,
}

impl AgentLoop {
    /// Create a new agent loop
    pub fn new(model: Arc<dyn ChatModel>, registry: ToolRegistry, config: AgentConfig) -> Self {
        info!(
            model = %config.model,
            tools = ?registry.list_names(),
            max_tool_rounds = config.max_tool_rounds,
            "Agent loop ready"
        );
        let sessions = SessionStore::new(config.context_budget_chars);

        Self {
            model,
            registry,
            config,
            sessions,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Answer one user query in the given session.
    ///
    /// Never fails: any error becomes [`APOLOGY`], and whatever was appended to
    /// the history before the failure stays there. The session is locked for
    /// the whole turn.
    #[instrument(skip(self, query), fields(model = %self.config.model))]
    pub async fn handle_turn(&self, session: &str, query: &str) -> String {
        let query = normalize_query(query, &self.config.default_query);
        if let Some(idle) = self.config.session_idle {
            self.sessions.evict_idle(idle);
        }
        let conversation = self.sessions.session(session);
        let mut conversation = conversation.lock().await;

        match self.run_turn(&mut conversation, &query).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, turns = conversation.len(), "Turn failed");
                APOLOGY.to_string()
            }
        }
    }

    /// Snapshot of a session's history
    pub async fn history(&self, session: &str) -> Vec<Turn> {
        self.sessions.session(session).lock().await.snapshot()
    }

    /// Run one turn against `conversation`, returning the final answer
    pub async fn run_turn(
        &self,
        conversation: &mut ConversationState,
        query: &str,
    ) -> Result<String, AgentError> {
        conversation.append(Turn::user(query));
        conversation.enforce_budget();

        let tool_defs = self.registry.definitions();
        let max_rounds = self.config.max_tool_rounds.max(1);
        let mut phase = TurnPhase::AwaitingFirstResponse;
        let mut rounds = 0;

        let answer = loop {
            let attach_tools = rounds < max_rounds;
            debug!(%phase, round = rounds + 1, attach_tools, turns = conversation.len(), "Requesting model");

            let tools = attach_tools.then_some(tool_defs.as_slice());
            let reply = self.request(conversation, tools, phase).await?;

            if reply.requested_tools().is_empty() {
                break reply.content;
            }
            if !attach_tools {
                debug!(
                    ignored = reply.requested_tools().len(),
                    "Ignoring tool calls in response to a tool-less request"
                );
                break reply.content;
            }

            phase = TurnPhase::ExecutingTools;
            debug!(%phase, calls = reply.requested_tools().len(), "Executing tool calls");
            self.execute_tool_calls(conversation, reply).await;

            rounds += 1;
            phase = TurnPhase::AwaitingFinalResponse;
        };

        conversation.append(Turn::assistant(answer.clone()));
        info!(
            phase = %TurnPhase::Idle,
            tool_rounds = rounds,
            turns = conversation.len(),
            "Turn completed"
        );

        Ok(answer)
    }

    async fn request(
        &self,
        conversation: &ConversationState,
        tools: Option<&[ToolDefinition]>,
        phase: TurnPhase,
    ) -> Result<ChatMessageWithTools, AgentError> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(Turn::system(self.config.system_prompt.clone()));
        messages.extend(conversation.snapshot());

        let response = self
            .model
            .chat_with_tools(&self.config.model, &messages, tools, Some(&self.config.options))
            .await
            .map_err(|source| AgentError::Model { phase, source })?;

        Ok(response.message)
    }

    /// Record the assistant's tool calls, then run each in order and record its result
    async fn execute_tool_calls(&self, conversation: &mut ConversationState, reply: ChatMessageWithTools) {
        let calls = assign_call_ids(reply.tool_calls.unwrap_or_default());
        conversation.append(Turn::assistant_with_tools(reply.content, calls.clone()));

        for call in &calls {
            let request = ToolCallRequest::from(call);
            let result = self.registry.dispatch(&request).await;
            conversation.append(Turn::tool_result(request.id, result.to_content()));
        }
    }
}

/// Give every call a unique correlation id; Ollama usually sends none
fn assign_call_ids(calls: Vec<ToolCall>) -> Vec<ToolCall> {
    let mut seen = HashSet::new();
    calls
        .into_iter()
        .map(|mut call| {
            if call.id.is_empty() || !seen.insert(call.id.clone()) {
                call.id = Uuid::new_v4().to_string();
                seen.insert(call.id.clone());
            }
            call
        })
        .collect()
}

impl std::fmt::Debug for AgentLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentLoop")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
