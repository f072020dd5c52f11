// Tool dispatch tests - the table never fails, and retries stack with the
// execution client's own attempts.

#[path = "../support/mod.rs"]
mod support;

use sentinel_assist_core::application::execution::{IncidentQueries, QueryExecutor, RetryPolicy};
use sentinel_assist_core::knowledge::{KnowledgeCorpus, KnowledgeDocument, LexicalKnowledgeBase};
use sentinel_assist_core::query::TemplateRegistry;
use sentinel_assist_core::types::ToolCall;
use sentinel_assist_core::ToolDispatcher;
use serde_json::{Map, json};
use std::sync::Arc;
use std::time::Duration;
use support::{Answer, Fallback, ScriptedBackend, args, incident_rows};

fn queries(backend: Arc<ScriptedBackend>) -> IncidentQueries {
    IncidentQueries::new(
        Arc::new(TemplateRegistry::default()),
        QueryExecutor::new(backend, RetryPolicy::new(3, Duration::from_secs(1))),
    )
}

fn document(text: &str) -> KnowledgeDocument {
    KnowledgeDocument {
        id: None,
        document: text.to_string(),
        metadata: Map::new(),
    }
}

fn knowledge() -> Arc<LexicalKnowledgeBase> {
    Arc::new(LexicalKnowledgeBase::new(KnowledgeCorpus {
        incidents: vec![document("Phishing email led to credential theft on a finance mailbox")],
        playbooks: vec![
            document("Phishing response: reset credentials, purge messages, block sender"),
            document("Ransomware containment: isolate hosts and disable accounts"),
        ],
    }))
}

#[tokio::test]
async fn unknown_tools_return_an_error_value() {
    let dispatcher = ToolDispatcher::new(queries(ScriptedBackend::new(Vec::new())));

    let result = dispatcher.dispatch("delete_everything", &Map::new()).await;

    assert_eq!(result, json!({"error": "Unknown tool: delete_everything"}));
}

#[tokio::test]
async fn malformed_arguments_never_reach_the_backend() {
    let backend = ScriptedBackend::new(Vec::new());
    let dispatcher = ToolDispatcher::new(queries(backend.clone()));

    let result = dispatcher
        .dispatch_call(&ToolCall::new("c1", "query_incidents", "{not json"))
        .await;

    assert_eq!(backend.calls(), 0);
    let message = result["error"].as_str().unwrap_or_default();
    assert!(message.starts_with("Invalid arguments for query_incidents"));
}

#[tokio::test]
async fn validation_errors_are_structured() {
    let backend = ScriptedBackend::new(Vec::new());
    let dispatcher = ToolDispatcher::new(queries(backend.clone()));

    let result = dispatcher
        .dispatch("query_alerts", &args(json!({"time_window": "forever"})))
        .await;

    assert_eq!(backend.calls(), 0);
    assert_eq!(result["code"], "invalid_param:time_window");
    assert_eq!(result["retry_possible"], false);
    assert_eq!(dispatcher.silent_retries(), 0);
}

#[tokio::test(start_paused = true)]
async fn dispatch_retry_stacks_on_client_attempts() {
    let backend = ScriptedBackend::with_fallback(Vec::new(), Fallback::Status(503));
    let dispatcher = ToolDispatcher::new(queries(backend.clone()));

    let result = dispatcher.dispatch("query_incidents", &Map::new()).await;

    assert_eq!(backend.calls(), 6);
    assert_eq!(dispatcher.silent_retries(), 1);
    assert_eq!(result["code"], "server_error");
    assert_eq!(result["retry_possible"], true);
}

#[tokio::test(start_paused = true)]
async fn dispatch_retry_recovers_silently() {
    let backend = ScriptedBackend::new(vec![
        Answer::Status(503),
        Answer::Status(503),
        Answer::Status(503),
        Answer::Rows(incident_rows(3)),
    ]);
    let dispatcher = ToolDispatcher::new(queries(backend.clone()));

    let result = dispatcher.dispatch("query_incidents", &Map::new()).await;

    assert_eq!(backend.calls(), 4);
    assert_eq!(result["metadata"]["total"], 3);
}

#[tokio::test]
async fn knowledge_tools_only_exist_when_attached() {
    let plain = ToolDispatcher::new(queries(ScriptedBackend::new(Vec::new())));
    assert_eq!(plain.tool_names().len(), 5);
    assert_eq!(plain.tool_definitions().len(), 5);
    let result = plain
        .dispatch("search_playbooks", &args(json!({"query": "phishing"})))
        .await;
    assert_eq!(result["error"], "Unknown tool: search_playbooks");

    let with_kb =
        ToolDispatcher::with_knowledge(queries(ScriptedBackend::new(Vec::new())), knowledge(), 0.35);
    assert_eq!(with_kb.tool_names().len(), 8);
    assert_eq!(with_kb.tool_definitions().len(), 8);
}

#[tokio::test]
async fn knowledge_searches_return_typed_results() {
    let dispatcher =
        ToolDispatcher::with_knowledge(queries(ScriptedBackend::new(Vec::new())), knowledge(), 0.99);

    let playbooks = dispatcher
        .dispatch("search_playbooks", &args(json!({"query": "phishing credentials"})))
        .await;
    assert_eq!(playbooks["type"], "playbooks");
    let top = playbooks["results"][0]["document"].as_str().unwrap_or_default();
    assert!(top.starts_with("Phishing response"));

    let guidance = dispatcher
        .dispatch("get_investigation_guidance", &args(json!({"query": "phishing"})))
        .await;
    assert_eq!(guidance["type"], "investigation_guidance");
    assert!(guidance["playbook_results"].is_array());
    assert!(guidance["incident_results"].is_array());

    let missing = dispatcher.dispatch("search_similar_incidents", &Map::new()).await;
    assert_eq!(missing["error"], "Missing required parameter: query");
}
