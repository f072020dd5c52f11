use crate::infrastructure::model::ModelError;
use thiserror::Error;

/// Failures that end a turn without an answer.
///
/// Tool failures are not here: they reach the model as tool-result data.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("turn cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
            AgentError::Cancelled => {
                "Cancelled. The conversation is unchanged.".to_string()
            }
        }
    }
}
