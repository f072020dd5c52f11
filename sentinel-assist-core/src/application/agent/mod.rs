mod conversation;
mod errors;
mod footer;
mod instructions;
mod models;
mod runner;


pub use conversation::{ConversationState, Exchange};
pub use errors::AgentError;
pub use footer::build_footer;
pub use instructions::{
    CLEAR_SUMMARY_REQUEST, DISCLAIMER, HISTORY_TRIMMED_WARNING, NOTHING_TO_CLEAR,
    ROUND_LIMIT_MESSAGE, summary_seed, system_instructions,
};
pub use models::{AgentOptions, ProgressEvent, ToolInvocation, TurnOutcome};
pub use runner::Orchestrator;
