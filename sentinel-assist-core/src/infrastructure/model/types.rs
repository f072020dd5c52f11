//! Model types - Request, Response, and Error types

use crate::domain::types::ChatMessage;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Whether the model may request tools on this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoice {
    #[default]
    Auto,
    /// Forces a text answer.
    None,
}

impl ToolChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
        }
    }
}

/// Model request for LLM chat
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Tool definitions in chat-completions format; omitted from the wire when empty.
    pub tools: Vec<Value>,
    pub tool_choice: ToolChoice,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: ToolChoice::Auto,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>, tool_choice: ToolChoice) -> Self {
        self.tools = tools;
        self.tool_choice = tool_choice;
        self
    }
}

/// Model response from LLM
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

impl ModelResponse {
    pub fn new(message: ChatMessage) -> Self {
        Self {
            message,
            finish_reason: None,
        }
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: StatusCode,
        body: String,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn status(provider: impl Into<String>, status: StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Message suitable for the chat transcript
    pub fn user_message(&self) -> String {
        match self {
            ModelError::MissingApiKey { provider } => {
                format!("The model provider '{provider}' needs an API key. Check config/.env.")
            }
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Could not connect to the model provider '{provider}'.")
                } else if source.is_timeout() {
                    format!("The request to '{provider}' timed out. Try again shortly.")
                } else {
                    format!("Network error while contacting '{provider}'.")
                }
            }
            ModelError::Status { provider, status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    format!("The model provider '{provider}' rejected the credentials.")
                }
                StatusCode::NOT_FOUND => {
                    format!("The model endpoint for '{provider}' was not found. Check the deployment name.")
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    format!("The model provider '{provider}' is rate limiting requests. Try again shortly.")
                }
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                    format!("The model provider '{provider}' is unavailable. Try again later.")
                }
                other => format!("The request to '{provider}' failed with status {}.", other.as_u16()),
            },
            ModelError::InvalidResponse { provider, .. } => {
                format!("The model provider '{provider}' returned a response that could not be read.")
            }
        }
    }
}
