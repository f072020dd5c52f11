use super::client::QueryExecutor;
use crate::application::projection::{View, project};
use crate::domain::outcome::{QueryError, QueryOutcome, QueryResult};
use crate::domain::records::{Alert, EntityCount, Incident, IncidentEntity, Record, TrendPoint};
use crate::query::{TemplateRegistry, templates};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// How the caller identified an incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentRef {
    /// Exact incident number.
    Number(u64),
    /// Case-insensitive title substring.
    Name(String),
}

impl IncidentRef {
    /// Integers and digit-only strings are numbers; other text is a title search.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_u64().map(IncidentRef::Number),
            Value::String(text) => {
                let text = text.trim().trim_start_matches('#');
                if text.is_empty() {
                    None
                } else if let Ok(number) = text.parse::<u64>() {
                    Some(IncidentRef::Number(number))
                } else {
                    Some(IncidentRef::Name(text.to_string()))
                }
            }
            _ => None,
        }
    }
}

/// The read-only workspace operations: build, execute, parse, project.
#[derive(Clone)]
pub struct IncidentQueries {
    registry: Arc<TemplateRegistry>,
    executor: QueryExecutor,
}

impl IncidentQueries {
    pub fn new(registry: Arc<TemplateRegistry>, executor: QueryExecutor) -> Self {
        Self { registry, executor }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    async fn run(&self, template: &str, params: &Map<String, Value>) -> QueryOutcome<Record> {
        match self.registry.build(template, params) {
            Ok(built) => {
                debug!(template, timeout_secs = built.timeout.as_secs(), "Built query");
                self.executor.execute(&built).await
            }
            Err(err) => {
                warn!(template, code = %err.code(), error = %err, "Rejected query parameters");
                QueryError::validation(err.code(), err.to_string()).into()
            }
        }
    }

    pub async fn query_incidents(&self, args: &Map<String, Value>) -> QueryOutcome {
        self.run(templates::LIST_INCIDENTS, args)
            .await
            .map_results(|row| to_json(&Incident::from_row(&row, false)))
            .map_results(|value| View::IncidentList.apply(value))
    }

    pub async fn query_alerts(&self, args: &Map<String, Value>) -> QueryOutcome {
        self.run(templates::LIST_ALERTS, args)
            .await
            .map_results(|row| to_json(&Alert::from_row(&row)))
            .map_results(|value| View::AlertList.apply(value))
    }

    /// Per-severity buckets by default; `by_severity: false` gives one series.
    pub async fn get_alert_trend(&self, args: &Map<String, Value>) -> QueryOutcome {
        let by_severity = args
            .get("by_severity")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let template = if by_severity {
            templates::ALERT_TREND
        } else {
            templates::ALERT_TREND_TOTAL
        };
        self.run(template, args)
            .await
            .map_results(|row| to_json(&TrendPoint::from_row(&row)))
    }

    pub async fn get_top_entities(&self, args: &Map<String, Value>) -> QueryOutcome {
        self.run(templates::TOP_ENTITIES, args)
            .await
            .map_results(|row| to_json(&EntityCount::from_row(&row)))
    }

    /// Look an incident up and attach its alerts and entities.
    ///
    /// The result holds a single `{incidents, alerts, entities}` object.
    /// Sub-query failures leave the corresponding list empty.
    pub async fn get_incident_detail(&self, args: &Map<String, Value>) -> QueryOutcome {
        let Some(raw) = args.get("incident_ref").filter(|value| !value.is_null()) else {
            return QueryError::validation(
                "missing_param:incident_ref",
                "missing required parameter 'incident_ref'",
            )
            .into();
        };
        let Some(incident_ref) = IncidentRef::parse(raw) else {
            return QueryError::validation(
                "invalid_param:incident_ref",
                "expected an incident number or a title search string",
            )
            .into();
        };

        let mut params = Map::new();
        let template = match &incident_ref {
            IncidentRef::Number(number) => {
                params.insert("incident_number".into(), json!(number));
                templates::GET_INCIDENT_BY_NUMBER
            }
            IncidentRef::Name(name) => {
                params.insert("incident_name".into(), json!(name));
                templates::GET_INCIDENT_BY_NAME
            }
        };

        let found = match self.run(template, &params).await {
            QueryOutcome::Result(found) => found,
            QueryOutcome::Error(err) => return QueryOutcome::Error(err),
        };
        let mut incidents: Vec<Incident> = found
            .results
            .iter()
            .map(|row| Incident::from_row(row, true))
            .collect();

        let related = join_all(incidents.iter().map(|incident| self.related(incident.number))).await;

        let mut alerts = Vec::new();
        let mut entities = Vec::new();
        for (incident, (incident_alerts, incident_entities)) in incidents.iter_mut().zip(related) {
            if let Some(incident_entities) = incident_entities {
                incident.entity_count = incident_entities.len();
                entities.extend(incident_entities.iter().map(to_json));
            }
            alerts.extend(incident_alerts.iter().map(to_json));
        }

        let detail = json!({
            "incidents": project(
                View::IncidentDetail.name(),
                incidents.iter().map(to_json).collect(),
            ),
            "alerts": project(View::AlertList.name(), alerts),
            "entities": entities,
        });

        let mut metadata = found.metadata;
        metadata.total = incidents.len();
        QueryOutcome::Result(QueryResult {
            metadata,
            results: vec![detail],
            retries: found.retries,
        })
    }

    /// Alerts and entities for one incident, fetched concurrently.
    async fn related(&self, number: u64) -> (Vec<Alert>, Option<Vec<IncidentEntity>>) {
        let mut params = Map::new();
        params.insert("incident_number".into(), json!(number));

        let (alerts, entities) = futures::join!(
            self.run(templates::GET_INCIDENT_ALERTS, &params),
            self.run(templates::GET_INCIDENT_ENTITIES, &params),
        );

        let alerts = match alerts {
            QueryOutcome::Result(result) => result.results.iter().map(Alert::from_row).collect(),
            QueryOutcome::Error(err) => {
                warn!(incident = number, code = %err.code, "Alert sub-query failed");
                Vec::new()
            }
        };
        let entities = match entities {
            QueryOutcome::Result(result) => Some(
                result
                    .results
                    .iter()
                    .map(IncidentEntity::from_row)
                    .collect(),
            ),
            QueryOutcome::Error(err) => {
                warn!(incident = number, code = %err.code, "Entity sub-query failed");
                None
            }
        };
        (alerts, entities)
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}
