use crate::constants::{DEFAULT_CHAT_DEPLOYMENT, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_MAX_TURNS};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: String,
    /// Model/tool rounds per turn before the forced final answer.
    pub max_tool_rounds: usize,
    /// Exchanges kept in history.
    pub max_turns: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_DEPLOYMENT.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

/// One dispatched tool call, as recorded for the transparency footer.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    pub round: usize,
    pub call_id: String,
    pub tool: String,
    pub arguments: Value,
    pub preview: String,
    pub partial: bool,
    pub failed: bool,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: String,
    pub tool_log: Vec<ToolInvocation>,
    /// Rounds that requested tools.
    pub rounds: usize,
    pub model_calls: usize,
    pub round_limit_hit: bool,
    /// Exchanges dropped from history after this turn.
    pub evicted: usize,
    pub footer: String,
}

/// Progress notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    ToolStarted {
        tool: String,
        status: &'static str,
    },
    RoundLimitReached {
        rounds: usize,
    },
    HistoryTrimmed {
        evicted: usize,
    },
}
