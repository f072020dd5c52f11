use super::conversation::{ConversationState, Exchange};
use super::errors::AgentError;
use super::footer::build_footer;
use super::instructions::{
    CLEAR_SUMMARY_REQUEST, NOTHING_TO_CLEAR, ROUND_LIMIT_MESSAGE, summary_seed, system_instructions,
};
use super::models::{AgentOptions, ProgressEvent, ToolInvocation, TurnOutcome};
use crate::application::tooling::{ToolDispatcher, preview};
use crate::domain::types::{ChatMessage, ToolCall};
use crate::infrastructure::model::{ModelProvider, ModelRequest, ToolChoice};
use futures::future::join_all;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Round-bounded tool-calling loop for one conversation.
///
/// History is only mutated once a turn has produced its answer, so a turn
/// that fails or is dropped midway leaves the conversation as it was.
pub struct Orchestrator {
    provider: Arc<dyn ModelProvider>,
    dispatcher: Arc<ToolDispatcher>,
    options: AgentOptions,
    instructions: String,
    tools: Vec<Value>,
    state: ConversationState,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        dispatcher: Arc<ToolDispatcher>,
        options: AgentOptions,
    ) -> Self {
        let tools = dispatcher.tool_definitions();
        let include_knowledge = dispatcher.has_knowledge();
        Self {
            provider,
            dispatcher,
            options,
            instructions: system_instructions(include_knowledge),
            tools,
            state: ConversationState::new(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// User turns since start or the last clear.
    pub fn history_len(&self) -> usize {
        self.state.turn_count()
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(event);
        }
    }

    fn messages(&self, history: &[ChatMessage], pending: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + pending.len() + 1);
        messages.push(ChatMessage::system(self.instructions.clone()));
        messages.extend(history.iter().cloned());
        messages.extend(pending.iter().cloned());
        messages
    }

    /// Run one user turn to its answer.
    pub async fn send_message(&mut self, input: &str) -> Result<TurnOutcome, AgentError> {
        let span = info_span!("turn", turn_id = %Uuid::new_v4());
        self.run_turn(input).instrument(span).await
    }

    async fn run_turn(&mut self, input: &str) -> Result<TurnOutcome, AgentError> {
        let history = self.state.history();
        let mut pending = vec![ChatMessage::user(input)];
        let mut tool_log: Vec<ToolInvocation> = Vec::new();
        let mut model_calls = 0;
        let mut rounds = 0;
        let mut answer = None;

        info!(turn = self.state.turn_count() + 1, "User turn started");

        while rounds < self.options.max_tool_rounds {
            let request = ModelRequest::new(&self.options.model, self.messages(&history, &pending))
                .with_tools(self.tools.clone(), ToolChoice::Auto);
            let response = self.provider.chat(request).await?;
            model_calls += 1;
            let message = response.message;

            if !message.requests_tools() {
                debug!(model_calls, "Model answered without tools");
                answer = Some(message.content.clone());
                pending.push(message);
                break;
            }

            rounds += 1;
            info!(round = rounds, calls = message.tool_calls.len(), "Executing tool calls");
            let calls = message.tool_calls.clone();
            pending.push(message);

            let results = join_all(calls.iter().map(|call| self.execute(call))).await;
            for (call, result) in calls.iter().zip(results) {
                pending.push(ChatMessage::tool_result(&call.id, &call.name, result.to_string()));
                tool_log.push(invocation(rounds, call, &result));
            }
        }

        let round_limit_hit = answer.is_none();
        let response = match answer {
            Some(answer) => answer,
            None => {
                warn!(rounds, "Round limit reached, forcing a final answer");
                self.emit(ProgressEvent::RoundLimitReached { rounds });
                pending.push(ChatMessage::user(ROUND_LIMIT_MESSAGE));
                let request = ModelRequest::new(&self.options.model, self.messages(&history, &pending))
                    .with_tools(self.tools.clone(), ToolChoice::None);
                let response = self.provider.chat(request).await?;
                model_calls += 1;
                // Any tool requests in the forced answer are ignored.
                let content = response.message.content;
                pending.push(ChatMessage::assistant(content.clone()));
                content
            }
        };

        let evicted = self
            .state
            .commit(Exchange { messages: pending }, self.options.max_turns);
        if evicted > 0 {
            self.emit(ProgressEvent::HistoryTrimmed { evicted });
        }

        let footer = build_footer(&tool_log, round_limit_hit, rounds);
        info!(model_calls, rounds, tools = tool_log.len(), "User turn completed");
        Ok(TurnOutcome {
            response,
            tool_log,
            rounds,
            model_calls,
            round_limit_hit,
            evicted,
            footer,
        })
    }

    /// Run a turn unless `cancel` resolves first. A cancelled turn leaves
    /// history untouched and drops any in-flight model or backend calls.
    pub async fn send_message_or_cancel<F>(
        &mut self,
        input: &str,
        cancel: F,
    ) -> Result<TurnOutcome, AgentError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            outcome = self.send_message(input) => outcome,
            _ = cancel => {
                info!("User turn cancelled");
                Err(AgentError::Cancelled)
            }
        }
    }

    async fn execute(&self, call: &ToolCall) -> Value {
        self.emit(ProgressEvent::ToolStarted {
            tool: call.name.clone(),
            status: self.dispatcher.status_message(&call.name),
        });
        self.dispatcher.dispatch_call(call).await
    }

    /// Replace history with a model-written summary of it.
    ///
    /// Returns the summary, or a fixed notice when there is nothing to clear.
    pub async fn clear(&mut self) -> Result<String, AgentError> {
        if self.state.is_empty() {
            return Ok(NOTHING_TO_CLEAR.to_string());
        }

        let history = self.state.history();
        let request = ModelRequest::new(
            &self.options.model,
            self.messages(&history, &[ChatMessage::user(CLEAR_SUMMARY_REQUEST)]),
        );
        let response = self.provider.chat(request).await?;
        let summary = match response.message.content.trim() {
            "" => "Session cleared.".to_string(),
            text => text.to_string(),
        };

        self.state
            .reset_with_summary(ChatMessage::assistant(summary_seed(&summary)));
        info!("Conversation cleared with summary");
        Ok(summary)
    }
}

fn invocation(round: usize, call: &ToolCall, result: &Value) -> ToolInvocation {
    let arguments = serde_json::from_str(&call.arguments).unwrap_or(Value::Null);
    let partial = result
        .pointer("/metadata/partial_error")
        .is_some_and(|detail| !detail.is_null());
    let failed = result.get("error").is_some() || result.get("code").is_some();
    ToolInvocation {
        round,
        call_id: call.id.clone(),
        tool: call.name.clone(),
        arguments,
        preview: preview(result),
        partial,
        failed,
    }
}
