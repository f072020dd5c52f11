use super::auth::TokenSource;
use super::types::{BackendError, BackendRequest, BackendResponse, QueryBackend};
use crate::config::WorkspaceConfig;
use crate::constants::QUERY_TIMEOUT_SLACK_SECS;
use crate::domain::records::Record;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Log Analytics query API client (`POST /v1/workspaces/{id}/query`).
pub struct LogAnalyticsBackend {
    http: Client,
    url: String,
    tokens: TokenSource,
}

impl LogAnalyticsBackend {
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        let http = Client::new();
        let url = format!(
            "{}/v1/workspaces/{}/query",
            config.endpoint.trim_end_matches('/'),
            config.id
        );
        Self {
            tokens: TokenSource::new(config.auth.clone(), http.clone()),
            http,
            url,
        }
    }
}

#[async_trait]
impl QueryBackend for LogAnalyticsBackend {
    async fn query(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        let token = self.tokens.token().await?;
        let body = json!({
            "query": request.query,
            "timespan": iso8601_duration(request.timespan),
        });

        debug!(url = %self.url, timeout_secs = request.timeout.as_secs(), "Posting workspace query");
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(token)
            .header(
                "Prefer",
                format!("wait={}, include-statistics=true", request.timeout.as_secs()),
            )
            // Outlive the server's own wait so its error reaches the caller.
            .timeout(request.timeout + Duration::from_secs(QUERY_TIMEOUT_SLACK_SECS))
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    BackendError::Timeout(request.timeout)
                } else {
                    BackendError::Network(err.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| BackendError::Network(err.to_string()))?;
        let payload = match serde_json::from_str::<Value>(&text) {
            Ok(payload) => payload,
            Err(_) if !(200..300).contains(&status) => Value::String(text),
            Err(err) => return Err(BackendError::InvalidResponse(err.to_string())),
        };
        parse_response(status, payload)
    }
}

#[derive(Deserialize)]
struct QueryBody {
    #[serde(default)]
    tables: Vec<Table>,
    error: Option<ApiError>,
    statistics: Option<Value>,
}

#[derive(Deserialize)]
struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct Column {
    name: String,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl ApiError {
    fn describe(&self) -> String {
        match (self.code.is_empty(), self.message.is_empty()) {
            (false, false) => format!("{}: {}", self.code, self.message),
            (false, true) => self.code.clone(),
            (true, false) => self.message.clone(),
            (true, true) => "Partial results".to_string(),
        }
    }
}

/// Classify a response. A 200 that carries a top-level `error` is partial.
fn parse_response(status: u16, payload: Value) -> Result<BackendResponse, BackendError> {
    if !(200..300).contains(&status) {
        let message = payload
            .get("error")
            .and_then(|err| serde_json::from_value::<ApiError>(err.clone()).ok())
            .map(|err| err.describe())
            .unwrap_or_else(|| match &payload {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            });
        warn!(status, %message, "Workspace query failed");
        return Err(BackendError::from_status(status, message));
    }

    let body: QueryBody = serde_json::from_value(payload)
        .map_err(|err| BackendError::InvalidResponse(err.to_string()))?;

    if let Some(seconds) = body
        .statistics
        .as_ref()
        .and_then(|stats| stats.pointer("/query/executionTime"))
        .and_then(Value::as_f64)
    {
        debug!(server_ms = seconds * 1000.0, "Workspace reported execution time");
    }

    let rows = body
        .tables
        .into_iter()
        .next()
        .map(table_rows)
        .unwrap_or_default();

    match body.error {
        Some(err) => {
            let detail = err.describe();
            info!(rows = rows.len(), %detail, "Workspace returned partial results");
            Ok(BackendResponse::Partial { rows, detail })
        }
        None => Ok(BackendResponse::Complete { rows }),
    }
}

fn table_rows(table: Table) -> Vec<Record> {
    let names: Vec<String> = table.columns.into_iter().map(|c| c.name).collect();
    table
        .rows
        .into_iter()
        .map(|row| {
            names
                .iter()
                .cloned()
                .zip(row)
                .collect::<Map<String, Value>>()
        })
        .collect()
}

/// Render a duration as an ISO-8601 duration (`P7D`, `PT1H`, `PT90S`).
pub fn iso8601_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return "PT0S".to_string();
    }
    if secs % 86_400 == 0 {
        format!("P{}D", secs / 86_400)
    } else if secs % 3_600 == 0 {
        format!("PT{}H", secs / 3_600)
    } else if secs % 60 == 0 {
        format!("PT{}M", secs / 60)
    } else {
        format!("PT{secs}S")
    }
}
