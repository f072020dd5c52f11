// Orchestration loop tests - bounded rounds, commit-on-success history and
// the transparency footer, with a scripted model and backend.

#[path = "../support/mod.rs"]
mod support;

use sentinel_assist_core::application::bootstrap::build_dispatcher;
use sentinel_assist_core::config::parse_config;
use sentinel_assist_core::model::ToolChoice;
use sentinel_assist_core::types::{ChatMessage, MessageRole, ToolCall};
use sentinel_assist_core::{AgentOptions, Orchestrator};
use std::sync::Arc;
use support::{Answer, Fallback, ScriptedBackend, ScriptedProvider, incident_rows};

const CONFIG: &str = r#"
[model]
endpoint = "https://example.openai.azure.com"
api_key = "key"

[workspace]
id = "00000000-0000-0000-0000-000000000000"
access_token = "token"

[query]
max_attempts = 1
"#;

fn orchestrator(
    provider: &ScriptedProvider,
    backend: Arc<ScriptedBackend>,
    max_tool_rounds: usize,
    max_turns: usize,
) -> Orchestrator {
    let config = parse_config(CONFIG).expect("valid config");
    let dispatcher = build_dispatcher(&config, backend).expect("dispatcher");
    Orchestrator::new(
        Arc::new(provider.clone()),
        dispatcher,
        AgentOptions {
            model: "gpt-test".into(),
            max_tool_rounds,
            max_turns,
        },
    )
}

fn tool_request(id: &str, name: &str, arguments: &str) -> ChatMessage {
    ChatMessage::assistant_with_tools("", vec![ToolCall::new(id, name, arguments)])
}

#[tokio::test]
async fn model_that_always_wants_tools_gets_rounds_plus_one_calls() {
    for rounds in [1, 3, 5] {
        let provider =
            ScriptedProvider::repeating(tool_request("x", "query_incidents", r#"{"limit": 5}"#));
        let backend = ScriptedBackend::with_fallback(Vec::new(), Fallback::Rows(incident_rows(2)));
        let mut agent = orchestrator(&provider, backend.clone(), rounds, 30);

        let outcome = agent.send_message("keep digging").await.expect("turn succeeds");

        assert_eq!(provider.requests().len(), rounds + 1);
        assert_eq!(backend.calls(), rounds);
        assert!(outcome.round_limit_hit);
        assert_eq!(outcome.tool_log.len(), rounds);
        let final_request = provider.requests().pop().expect("final request");
        assert_eq!(final_request.tool_choice, ToolChoice::None);
    }
}

#[tokio::test]
async fn history_keeps_only_the_newest_exchanges() {
    let provider = ScriptedProvider::repeating(ChatMessage::assistant("noted"));
    let mut agent = orchestrator(&provider, ScriptedBackend::new(Vec::new()), 5, 3);

    let mut evicted = 0;
    for turn in 0..6 {
        evicted += agent
            .send_message(&format!("question {turn}"))
            .await
            .expect("turn succeeds")
            .evicted;
    }

    assert_eq!(evicted, 3);

    // The request for the next turn carries only the retained exchanges.
    agent
        .send_message("question 6")
        .await
        .expect("turn succeeds");
    let last = provider.requests().pop().expect("request");
    assert_eq!(last.messages[0].role, MessageRole::System);
    let first_user = last
        .messages
        .iter()
        .find(|message| message.role == MessageRole::User)
        .map(|message| message.content.clone());
    assert_eq!(first_user.as_deref(), Some("question 3"));
    let users = last
        .messages
        .iter()
        .filter(|message| message.role == MessageRole::User)
        .count();
    assert_eq!(users, 4);
}

#[tokio::test]
async fn footer_lists_every_tool_and_flags_partial_data() {
    let provider = ScriptedProvider::new(vec![
        ChatMessage::assistant_with_tools(
            "",
            vec![
                ToolCall::new("a", "query_incidents", r#"{"time_window": "last_24h"}"#),
                ToolCall::new("b", "get_top_entities", "{}"),
            ],
        ),
        ChatMessage::assistant("Two incidents, top entity alice."),
    ]);
    let backend = ScriptedBackend::new(vec![
        Answer::Partial(incident_rows(2), "partial result"),
        Answer::Rows(Vec::new()),
    ]);
    let mut agent = orchestrator(&provider, backend, 5, 30);

    let outcome = agent.send_message("summary please").await.expect("turn succeeds");

    assert_eq!(outcome.response, "Two incidents, top entity alice.");
    assert!(outcome.footer.contains("query_incidents(time_window=last_24h)"));
    assert!(outcome.footer.contains("get_top_entities"));
    assert!(outcome.footer.contains("(partial)"));
    assert!(outcome.footer.contains("Some results are partial"));
    assert!(outcome.tool_log.iter().any(|entry| entry.partial));
}

#[tokio::test]
async fn failed_model_call_leaves_history_untouched() {
    let provider = ScriptedProvider::new(vec![
        ChatMessage::assistant("first"),
        tool_request("x", "query_alerts", "{}"),
    ]);
    let mut agent = orchestrator(&provider, ScriptedBackend::new(Vec::new()), 5, 30);

    agent.send_message("one").await.expect("turn succeeds");
    assert!(agent.send_message("two").await.is_err());

    assert_eq!(agent.history_len(), 1);
    assert_eq!(agent.state().exchange_count(), 1);
}
