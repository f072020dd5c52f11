use super::operation::{DEFAULT_STATUS, Operation};
use super::schema::tool_definitions;
use crate::application::execution::IncidentQueries;
use crate::domain::outcome::{QueryError, QueryOutcome};
use crate::domain::types::ToolCall;
use crate::infrastructure::knowledge::{GuidanceResult, KnowledgeBase, format_matches};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info};

/// Matches returned per knowledge base search.
const KB_RESULTS: usize = 3;

/// Routes tool names to operations.
///
/// The table is fixed at construction: the five workspace operations, plus
/// the three knowledge base operations when a knowledge base is attached.
/// Every call returns a JSON value; nothing here returns an error or panics.
pub struct ToolDispatcher {
    queries: IncidentQueries,
    knowledge: Option<Arc<dyn KnowledgeBase>>,
    low_confidence_distance: f32,
    table: HashMap<&'static str, Operation>,
    silent_retries: AtomicU32,
}

impl ToolDispatcher {
    pub fn new(queries: IncidentQueries) -> Self {
        Self::build(queries, None, 0.0)
    }

    pub fn with_knowledge(
        queries: IncidentQueries,
        knowledge: Arc<dyn KnowledgeBase>,
        low_confidence_distance: f32,
    ) -> Self {
        Self::build(queries, Some(knowledge), low_confidence_distance)
    }

    fn build(
        queries: IncidentQueries,
        knowledge: Option<Arc<dyn KnowledgeBase>>,
        low_confidence_distance: f32,
    ) -> Self {
        let mut table: HashMap<&'static str, Operation> = Operation::WORKSPACE
            .into_iter()
            .map(|operation| (operation.name(), operation))
            .collect();
        if knowledge.is_some() {
            table.extend(
                Operation::KNOWLEDGE
                    .into_iter()
                    .map(|operation| (operation.name(), operation)),
            );
        }
        Self {
            queries,
            knowledge,
            low_confidence_distance,
            table,
            silent_retries: AtomicU32::new(0),
        }
    }

    /// Registered operation names, sorted.
    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.table.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn has_knowledge(&self) -> bool {
        self.knowledge.is_some()
    }

    pub fn tool_definitions(&self) -> Vec<Value> {
        tool_definitions(self.queries.registry(), self.knowledge.is_some())
    }

    pub fn status_message(&self, tool_name: &str) -> &'static str {
        self.table
            .get(tool_name)
            .map_or(DEFAULT_STATUS, |operation| operation.status_message())
    }

    /// Silent dispatch-level retries performed so far.
    pub fn silent_retries(&self) -> u32 {
        self.silent_retries.load(Ordering::Relaxed)
    }

    /// Dispatch a model tool call, parsing its raw argument text first.
    pub async fn dispatch_call(&self, call: &ToolCall) -> Value {
        match call.parsed_arguments() {
            Ok(args) => self.dispatch(&call.name, &args).await,
            Err(reason) => json!({
                "error": format!("Invalid arguments for {}: {reason}", call.name)
            }),
        }
    }

    pub async fn dispatch(&self, tool_name: &str, args: &Map<String, Value>) -> Value {
        let Some(operation) = self.table.get(tool_name).copied() else {
            info!(tool = tool_name, "Model requested an unknown tool");
            return json!({"error": format!("Unknown tool: {tool_name}")});
        };
        debug!(tool = tool_name, "Dispatching tool call");

        if operation.is_knowledge() {
            return self.dispatch_knowledge(operation, args).await;
        }

        let mut outcome = self.run(operation, args).await;
        if outcome.is_retryable() {
            self.silent_retries.fetch_add(1, Ordering::Relaxed);
            debug!(tool = tool_name, "Retryable error, retrying once");
            outcome = self.run(operation, args).await;
        }
        to_json(&outcome)
    }

    async fn run(&self, operation: Operation, args: &Map<String, Value>) -> QueryOutcome {
        match operation {
            Operation::QueryIncidents => self.queries.query_incidents(args).await,
            Operation::GetIncidentDetail => self.queries.get_incident_detail(args).await,
            Operation::QueryAlerts => self.queries.query_alerts(args).await,
            Operation::GetAlertTrend => self.queries.get_alert_trend(args).await,
            Operation::GetTopEntities => self.queries.get_top_entities(args).await,
            Operation::SearchSimilarIncidents
            | Operation::SearchPlaybooks
            | Operation::GetInvestigationGuidance => QueryError::validation(
                "unknown_operation",
                format!("{} is not a workspace query", operation.name()),
            )
            .into(),
        }
    }

    async fn dispatch_knowledge(&self, operation: Operation, args: &Map<String, Value>) -> Value {
        let Some(knowledge) = self.knowledge.as_ref() else {
            return json!({"error": "Knowledge base is not available."});
        };
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if query.is_empty() {
            return json!({"error": "Missing required parameter: query"});
        }

        let threshold = self.low_confidence_distance;
        match operation {
            Operation::SearchSimilarIncidents => {
                let matches = knowledge.search_similar_incidents(query, KB_RESULTS).await;
                to_json(&format_matches("similar_incidents", matches, threshold))
            }
            Operation::SearchPlaybooks => {
                let matches = knowledge.search_playbooks(query, KB_RESULTS).await;
                to_json(&format_matches("playbooks", matches, threshold))
            }
            _ => {
                let (playbooks, incidents) = futures::join!(
                    knowledge.search_playbooks(query, KB_RESULTS),
                    knowledge.search_similar_incidents(query, KB_RESULTS),
                );
                to_json(&GuidanceResult::combine(
                    format_matches("playbooks", playbooks, threshold),
                    format_matches("similar_incidents", incidents, threshold),
                ))
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|err| json!({"error": format!("Failed to serialise tool result: {err}")}))
}
