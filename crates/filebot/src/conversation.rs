//! Conversation history and per-session ownership
//!
//! A [`ConversationState`] is the ordered log of turns sent to the model on
//! every request. The [`SessionStore`] hands out one log per session key,
//! each behind its own async mutex so a whole turn can hold it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use llm_core::{ChatMessageWithTools, Role};
use tokio::sync::Mutex;
use tracing::debug;

/// One record in the conversation log
pub type Turn = ChatMessageWithTools;

/// Session used when the transport does not distinguish users
pub const DEFAULT_SESSION: &str = "default";

/// Ordered, append-only log of turns
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    turns: Vec<Turn>,
    budget_chars: Option<usize>,
}

impl ConversationState {
    /// Unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// History that drops its oldest exchanges once it outgrows `budget_chars`
    pub fn with_budget(budget_chars: Option<usize>) -> Self {
        Self {
            turns: Vec::new(),
            budget_chars,
        }
    }

    pub fn append(&mut self, turn: Turn) {
        debug_assert!(
            turn.role != Role::Tool || self.accepts_tool_turn(),
            "tool turn appended without a pending assistant tool call"
        );
        self.turns.push(turn);
    }

    /// Copy of the full log, in append order
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Approximate size of the log as the model sees it
    pub fn content_chars(&self) -> usize {
        self.turns.iter().map(turn_chars).sum()
    }

    /// Drop the oldest exchanges until the log fits the budget.
    ///
    /// An exchange runs from a user turn up to the next user turn, so an
    /// assistant turn is never separated from its tool results. The newest
    /// exchange (the one just started) is always kept. Returns the number of turns removed.
    pub fn enforce_budget(&mut self) -> usize {
        let Some(budget) = self.budget_chars else {
            return 0;
        };

        let mut removed = 0;
        while self.content_chars() > budget {
            let next_exchange = self
                .turns
                .iter()
                .skip(1)
                .position(|t| t.role == Role::User)
                .map(|p| p + 1);

            let Some(end) = next_exchange else {
                break;
            };
            self.turns.drain(..end);
            removed += end;
        }

        if removed > 0 {
            debug!(removed, remaining = self.turns.len(), budget, "Evicted old exchanges");
        }
        removed
    }

    fn accepts_tool_turn(&self) -> bool {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role != Role::Tool)
            .map_or(false, |t| {
                t.role == Role::Assistant && !t.requested_tools().is_empty()
            })
    }
}

fn turn_chars(turn: &Turn) -> usize {
    let calls: usize = turn
        .requested_tools()
        .iter()
        .map(|c| {
            c.function.name.chars().count() + c.function.arguments.to_string().chars().count()
        })
        .sum();
    turn.content.chars().count() + calls
}

/// Ways a log can break the tool-turn correlation rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairingError {
    #[error("tool turn {index} does not follow an assistant turn with tool calls")]
    Orphan { index: usize },

    #[error("tool turn {index} has no tool_call_id")]
    MissingId { index: usize },

    #[error("tool turn {index} answers unknown call {id}")]
    UnknownId { index: usize, id: String },

    #[error("tool turn {index} answers call {id} a second time")]
    Duplicate { index: usize, id: String },
}

/// Verify that every tool turn answers exactly one call of the assistant turn before it
pub fn check_tool_pairing(turns: &[Turn]) -> Result<(), PairingError> {
    let mut pending: Option<(HashSet<&str>, HashSet<&str>)> = None;

    for (index, turn) in turns.iter().enumerate() {
        match turn.role {
            Role::Tool => {
                let Some((requested, answered)) = pending.as_mut() else {
                    return Err(PairingError::Orphan { index });
                };
                let Some(id) = turn.tool_call_id.as_deref() else {
                    return Err(PairingError::MissingId { index });
                };
                if !requested.contains(id) {
                    return Err(PairingError::UnknownId {
                        index,
                        id: id.to_string(),
                    });
                }
                if !answered.insert(id) {
                    return Err(PairingError::Duplicate {
                        index,
                        id: id.to_string(),
                    });
                }
            }
            Role::Assistant if !turn.requested_tools().is_empty() => {
                let requested = turn.requested_tools().iter().map(|c| c.id.as_str()).collect();
                pending = Some((requested, HashSet::new()));
            }
            _ => pending = None,
        }
    }

    Ok(())
}

#[derive(Debug)]
struct SessionEntry {
    conversation: Arc<Mutex<ConversationState>>,
    last_used: Instant,
}

/// Conversation logs keyed by session.
///
/// Keys are only dropped by [`SessionStore::reset`] or
/// [`SessionStore::evict_idle`]; a store serving many users should call the
/// latter periodically.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    budget_chars: Option<usize>,
}

impl SessionStore {
    pub fn new(budget_chars: Option<usize>) -> Self {
        Self {
            sessions: DashMap::new(),
            budget_chars,
        }
    }

    /// The session's log, created empty on first use
    pub fn session(&self, key: &str) -> Arc<Mutex<ConversationState>> {
        let mut entry = self.sessions.entry(key.to_string()).or_insert_with(|| {
            debug!(session = key, "Created session");
            SessionEntry {
                conversation: Arc::new(Mutex::new(ConversationState::with_budget(
                    self.budget_chars,
                ))),
                last_used: Instant::now(),
            }
        });
        entry.last_used = Instant::now();
        entry.conversation.clone()
    }

    /// Forget a session; the next turn starts from an empty log
    pub fn reset(&self, key: &str) -> bool {
        self.sessions.remove(key).is_some()
    }

    /// Drop sessions not handed out for at least `max_idle`.
    ///
    /// A session whose log is still held by a caller is kept. Returns the
    /// number of sessions removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| {
            entry.last_used.elapsed() < max_idle || Arc::strong_count(&entry.conversation) > 1
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            debug!(removed, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
