//! Scripted collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use sentinel_assist_core::backend::{BackendError, BackendRequest, BackendResponse, QueryBackend};
use sentinel_assist_core::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use sentinel_assist_core::types::ChatMessage;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub type Record = Map<String, Value>;

/// What a [`ScriptedBackend`] answers once its queue is empty.
#[derive(Clone)]
pub enum Fallback {
    Rows(Vec<Record>),
    Status(u16),
}

pub enum Answer {
    Rows(Vec<Record>),
    Partial(Vec<Record>, &'static str),
    Status(u16),
}

/// Backend that replays queued answers and records every query text.
pub struct ScriptedBackend {
    answers: Mutex<VecDeque<Answer>>,
    fallback: Fallback,
    queries: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(answers: Vec<Answer>) -> Arc<Self> {
        Self::with_fallback(answers, Fallback::Rows(Vec::new()))
    }

    pub fn with_fallback(answers: Vec<Answer>, fallback: Fallback) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            fallback,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().expect("lock").len()
    }
}

#[async_trait]
impl QueryBackend for ScriptedBackend {
    async fn query(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        self.queries.lock().expect("lock").push(request.query.clone());
        let answer = self.answers.lock().expect("lock").pop_front();
        match answer {
            Some(Answer::Rows(rows)) => Ok(BackendResponse::Complete { rows }),
            Some(Answer::Partial(rows, detail)) => Ok(BackendResponse::Partial {
                rows,
                detail: detail.to_string(),
            }),
            Some(Answer::Status(status)) => Err(BackendError::from_status(status, "scripted failure")),
            None => match &self.fallback {
                Fallback::Rows(rows) => Ok(BackendResponse::Complete { rows: rows.clone() }),
                Fallback::Status(status) => {
                    Err(BackendError::from_status(*status, "scripted failure"))
                }
            },
        }
    }
}

/// Model stub replaying a fixed list of assistant messages.
#[derive(Clone)]
pub struct ScriptedProvider {
    responses: Arc<Mutex<VecDeque<ChatMessage>>>,
    repeat: Option<ChatMessage>,
    recordings: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ChatMessage>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            repeat: None,
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every request with `message`.
    pub fn repeating(message: ChatMessage) -> Self {
        Self {
            repeat: Some(message),
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.recordings.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.recordings.lock().expect("lock").push(request);
        let next = self.responses.lock().expect("lock").pop_front();
        next.or_else(|| self.repeat.clone())
            .map(ModelResponse::new)
            .ok_or_else(|| ModelError::invalid_response("scripted", "script exhausted"))
    }
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// `count` incident rows alternating between Medium and High severity.
pub fn incident_rows(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            record(serde_json::json!({
                "IncidentNumber": 100 + i,
                "Title": format!("Incident {i}"),
                "Severity": if i % 2 == 0 { "Medium" } else { "High" },
                "Status": "New",
                "CreatedTime": "2026-10-01T08:00:00Z",
                "LastModifiedTime": "2026-10-02T08:00:00Z",
                "AlertIds": "[\"a1\",\"a2\"]",
            }))
        })
        .collect()
}

pub fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
