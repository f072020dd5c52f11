// Execution client tests - retry classification, partial answers and the
// client-side row cap, run against a scripted backend on paused time.

#[path = "../support/mod.rs"]
mod support;

use sentinel_assist_core::QueryOutcome;
use sentinel_assist_core::application::execution::{QueryExecutor, RetryPolicy};
use sentinel_assist_core::query::{TemplateRegistry, templates};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use support::{Answer, Fallback, ScriptedBackend, args, incident_rows};

fn executor(backend: Arc<ScriptedBackend>) -> QueryExecutor {
    QueryExecutor::new(backend, RetryPolicy::new(3, Duration::from_secs(1)))
}

#[tokio::test(start_paused = true)]
async fn rate_limiting_is_retried_until_success() {
    let backend = ScriptedBackend::new(vec![
        Answer::Status(429),
        Answer::Status(429),
        Answer::Rows(incident_rows(2)),
    ]);
    let built = TemplateRegistry::default()
        .build(templates::LIST_INCIDENTS, &args(json!({})))
        .expect("builds");

    let outcome = executor(backend.clone()).execute(&built).await;

    assert_eq!(backend.calls(), 3);
    assert_eq!(outcome.retries(), 2);
    match outcome {
        QueryOutcome::Result(result) => {
            assert_eq!(result.metadata.total, 2);
            assert!(!result.metadata.truncated);
        }
        QueryOutcome::Error(err) => panic!("unexpected error: {err:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn persistent_server_errors_exhaust_attempts() {
    let backend = ScriptedBackend::with_fallback(Vec::new(), Fallback::Status(503));
    let built = TemplateRegistry::default()
        .build(templates::LIST_ALERTS, &args(json!({})))
        .expect("builds");

    let outcome = executor(backend.clone()).execute(&built).await;

    assert_eq!(backend.calls(), 3);
    match outcome {
        QueryOutcome::Error(err) => {
            assert_eq!(err.code, "server_error");
            assert!(err.retry_possible);
            assert_eq!(err.retries, 2);
        }
        QueryOutcome::Result(_) => panic!("expected an error"),
    }
}

#[tokio::test(start_paused = true)]
async fn client_errors_are_not_retried() {
    let backend = ScriptedBackend::new(vec![Answer::Status(400)]);
    let built = TemplateRegistry::default()
        .build(templates::LIST_ALERTS, &args(json!({})))
        .expect("builds");

    let outcome = executor(backend.clone()).execute(&built).await;

    assert_eq!(backend.calls(), 1);
    assert!(!outcome.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn partial_answers_are_returned_once_and_flagged() {
    let backend = ScriptedBackend::new(vec![Answer::Partial(
        incident_rows(30),
        "query exceeded memory limit",
    )]);
    let built = TemplateRegistry::default()
        .build(templates::LIST_INCIDENTS, &args(json!({"limit": 10})))
        .expect("builds");

    let outcome = executor(backend.clone()).execute(&built).await;

    assert_eq!(backend.calls(), 1);
    match outcome {
        QueryOutcome::Result(result) => {
            assert_eq!(result.metadata.total, 30);
            assert_eq!(result.results.len(), 10);
            assert!(result.metadata.truncated);
            assert_eq!(
                result.metadata.partial_error.as_deref(),
                Some("query exceeded memory limit")
            );
            assert_eq!(result.retries, 0);
        }
        QueryOutcome::Error(err) => panic!("unexpected error: {err:?}"),
    }
}
