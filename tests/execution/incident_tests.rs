// Incident operation tests - end to end from tool arguments through the
// builder, execution client and projection.

#[path = "../support/mod.rs"]
mod support;

use sentinel_assist_core::QueryOutcome;
use sentinel_assist_core::application::execution::{IncidentQueries, QueryExecutor, RetryPolicy};
use sentinel_assist_core::query::TemplateRegistry;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use support::{Answer, Fallback, ScriptedBackend, args, incident_rows, record};

fn queries(backend: Arc<ScriptedBackend>) -> IncidentQueries {
    IncidentQueries::new(
        Arc::new(TemplateRegistry::default()),
        QueryExecutor::new(backend, RetryPolicy::new(3, Duration::from_millis(10))),
    )
}

#[tokio::test]
async fn incident_list_is_capped_and_projected() {
    let backend = ScriptedBackend::new(vec![Answer::Rows(incident_rows(15))]);

    let outcome = queries(backend.clone())
        .query_incidents(&args(json!({
            "time_window": "last_24h",
            "min_severity": "Medium",
            "limit": 10,
        })))
        .await;

    let query = &backend.queries()[0];
    assert!(query.contains("ago(24h)"));
    assert!(query.contains("'Medium','High'"));
    assert!(query.contains("take 10"));

    let QueryOutcome::Result(result) = outcome else {
        panic!("expected results");
    };
    assert_eq!(result.metadata.total, 15);
    assert!(result.metadata.truncated);
    assert_eq!(result.results.len(), 10);
    for incident in &result.results {
        let severity = incident["severity"].as_str().unwrap_or_default();
        assert!(["Medium", "High"].contains(&severity));
        assert_eq!(incident["alert_count"], 2);
        assert!(incident.get("description").is_none());
    }
}

#[tokio::test]
async fn incident_detail_joins_alerts_and_entities() {
    let backend = ScriptedBackend::new(vec![
        Answer::Rows(incident_rows(1)),
        Answer::Rows(vec![record(json!({
            "AlertName": "Impossible travel",
            "DisplayName": "Impossible travel",
            "AlertSeverity": "High",
            "TimeGenerated": "2026-10-01T08:00:00Z",
        }))]),
        Answer::Rows(vec![
            record(json!({"EntityType": "account", "EntityName": "alice"})),
            record(json!({"EntityType": "ip", "EntityName": "10.0.0.1"})),
        ]),
    ]);

    let outcome = queries(backend.clone())
        .get_incident_detail(&args(json!({"incident_ref": "#100"})))
        .await;

    assert_eq!(backend.calls(), 3);
    let QueryOutcome::Result(result) = outcome else {
        panic!("expected results");
    };
    assert_eq!(result.metadata.total, 1);
    let detail = &result.results[0];
    assert_eq!(detail["incidents"][0]["number"], 100);
    assert_eq!(detail["alerts"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn failed_sub_queries_degrade_to_empty_lists() {
    let backend = ScriptedBackend::with_fallback(
        vec![Answer::Rows(incident_rows(1))],
        Fallback::Status(403),
    );

    let outcome = queries(backend)
        .get_incident_detail(&args(json!({"incident_ref": 100})))
        .await;

    let QueryOutcome::Result(result) = outcome else {
        panic!("expected results");
    };
    let detail = &result.results[0];
    assert_eq!(detail["alerts"], Value::Array(Vec::new()));
    assert_eq!(detail["entities"], Value::Array(Vec::new()));
    assert_eq!(detail["incidents"][0]["entity_count"], 0);
}

#[tokio::test]
async fn incident_reference_is_required() {
    let backend = ScriptedBackend::new(Vec::new());

    let outcome = queries(backend.clone()).get_incident_detail(&args(json!({}))).await;

    assert_eq!(backend.calls(), 0);
    let QueryOutcome::Error(err) = outcome else {
        panic!("expected an error");
    };
    assert_eq!(err.code, "missing_param:incident_ref");
}
