//! Outcome of a single template execution: either an envelope of rows or a
//! structured error the model can explain.

use crate::constants::MAX_ERROR_MESSAGE_CHARS;
use serde::Serialize;
use serde_json::Value;

/// Metadata that travels with every result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMetadata {
    /// Row count before any client-side cap.
    pub total: usize,
    /// Wall-clock time of the attempt that produced the rows.
    pub query_ms: f64,
    /// Set when the row cap was hit or the backend reported a partial response.
    pub truncated: bool,
    pub partial_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<T = Value> {
    pub metadata: QueryMetadata,
    pub results: Vec<T>,
    #[serde(skip)]
    pub retries: u32,
}

impl<T> QueryResult<T> {
    pub fn map_results<U>(self, f: impl FnMut(T) -> U) -> QueryResult<U> {
        QueryResult {
            metadata: self.metadata,
            results: self.results.into_iter().map(f).collect(),
            retries: self.retries,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.metadata.partial_error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryError {
    pub code: String,
    pub message: String,
    pub retry_possible: bool,
    #[serde(skip)]
    pub retries: u32,
}

impl QueryError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, retry_possible: bool) -> Self {
        let mut message: String = message.into();
        if message.chars().count() > MAX_ERROR_MESSAGE_CHARS {
            message = message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        }
        Self {
            code: code.into(),
            message,
            retry_possible,
            retries: 0,
        }
    }

    /// A caller-side mistake; never retried.
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, false)
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Exactly one of a result envelope or a structured error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome<T = Value> {
    Result(QueryResult<T>),
    Error(QueryError),
}

impl<T> QueryOutcome<T> {
    pub fn is_retryable(&self) -> bool {
        match self {
            QueryOutcome::Result(_) => false,
            QueryOutcome::Error(err) => err.retry_possible,
        }
    }

    /// Retries the execution client spent before producing this outcome.
    pub fn retries(&self) -> u32 {
        match self {
            QueryOutcome::Result(result) => result.retries,
            QueryOutcome::Error(err) => err.retries,
        }
    }

    pub fn map_results<U>(self, f: impl FnMut(T) -> U) -> QueryOutcome<U> {
        match self {
            QueryOutcome::Result(result) => QueryOutcome::Result(result.map_results(f)),
            QueryOutcome::Error(err) => QueryOutcome::Error(err),
        }
    }
}

impl<T> From<QueryError> for QueryOutcome<T> {
    fn from(err: QueryError) -> Self {
        QueryOutcome::Error(err)
    }
}
