//! Message adapters - convert between chat messages and the chat-completions wire format

use super::types::{ModelError, ModelRequest, ModelResponse};
use crate::domain::types::{ChatMessage, MessageRole, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Adapter for converting messages to and from the chat-completions format
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to OpenAI-style format, including tool calls and
    /// tool results.
    pub fn to_openai_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages.iter().map(Self::message_to_openai).collect()
    }

    fn message_to_openai(msg: &ChatMessage) -> Value {
        match msg.role {
            MessageRole::Assistant if msg.requests_tools() => {
                let calls: Vec<Value> = msg
                    .tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {"name": call.name, "arguments": call.arguments}
                        })
                    })
                    .collect();
                let content = if msg.content.is_empty() {
                    Value::Null
                } else {
                    Value::String(msg.content.clone())
                };
                json!({"role": "assistant", "content": content, "tool_calls": calls})
            }
            MessageRole::Tool => json!({
                "role": "tool",
                "tool_call_id": msg.tool_call_id.clone().unwrap_or_default(),
                "content": msg.content.clone()
            }),
            role => json!({
                "role": role.as_str(),
                "content": msg.content.clone()
            }),
        }
    }

    /// Build the request body. `model` is omitted for Azure, where the
    /// deployment lives in the URL.
    pub fn to_openai_request(request: &ModelRequest, include_model: bool) -> ChatCompletionRequest {
        let has_tools = !request.tools.is_empty();
        ChatCompletionRequest {
            model: include_model.then(|| request.model.clone()),
            messages: Self::to_openai_format(&request.messages),
            tools: has_tools.then(|| request.tools.clone()),
            tool_choice: has_tools.then(|| request.tool_choice.as_str().to_string()),
        }
    }

    /// Take the first choice of a completion as an assistant message.
    pub fn from_openai_response(
        provider: &str,
        response: ChatCompletionResponse,
    ) -> Result<ModelResponse, ModelError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::invalid_response(provider, "no choices in response"))?;
        let message = choice
            .message
            .ok_or_else(|| ModelError::invalid_response(provider, "missing message"))?;

        let tool_calls: Vec<ToolCall> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
            .collect();
        let content = message.content.unwrap_or_default();
        if content.is_empty() && tool_calls.is_empty() && choice.finish_reason.as_deref() != Some("stop") {
            return Err(ModelError::invalid_response(provider, "missing content"));
        }

        Ok(ModelResponse {
            message: ChatMessage::assistant_with_tools(content, tool_calls),
            finish_reason: choice.finish_reason,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<WireMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    pub function: WireFunction,
}

#[derive(Debug, Deserialize)]
pub struct WireFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}
