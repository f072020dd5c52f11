use crate::domain::records::Record;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub query: String,
    /// Server-side timeout the backend should honour.
    pub timeout: Duration,
    /// Lookback hint; the query text carries its own filter as well.
    pub timespan: Duration,
}

/// The two non-failing shapes a backend answer can take.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendResponse {
    Complete { rows: Vec<Record> },
    /// Rows were returned but the backend reported the result as incomplete.
    Partial { rows: Vec<Record>, detail: String },
}

impl BackendResponse {
    pub fn rows(&self) -> &[Record] {
        match self {
            BackendResponse::Complete { rows } | BackendResponse::Partial { rows, .. } => rows,
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("rate limited by the workspace: {0}")]
    RateLimited(String),

    #[error("workspace returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("query rejected: {0}")]
    BadRequest(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("workspace not found: {0}")]
    NotFound(String),

    #[error("unexpected HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response from workspace: {0}")]
    InvalidResponse(String),

    #[error("failed to acquire workspace token: {0}")]
    Auth(String),
}

impl BackendError {
    /// Map an HTTP failure status onto the taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => BackendError::BadRequest(message),
            401 => BackendError::Unauthorized(message),
            403 => BackendError::Forbidden(message),
            404 => BackendError::NotFound(message),
            429 => BackendError::RateLimited(message),
            500 | 502 | 503 | 504 => BackendError::Server { status, message },
            _ => BackendError::Http { status, message },
        }
    }

    /// Network failure, timeout, rate limiting and 5xx-class responses.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::Network(_)
                | BackendError::Timeout(_)
                | BackendError::RateLimited(_)
                | BackendError::Server { .. }
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Network(_) => "network_error",
            BackendError::Timeout(_) => "timeout",
            BackendError::RateLimited(_) => "rate_limited",
            BackendError::Server { .. } => "server_error",
            BackendError::BadRequest(_) => "bad_request",
            BackendError::Unauthorized(_) => "unauthorized",
            BackendError::Forbidden(_) => "forbidden",
            BackendError::NotFound(_) => "not_found",
            BackendError::Http { .. } => "http_error",
            BackendError::InvalidResponse(_) => "invalid_response",
            BackendError::Auth(_) => "auth_error",
        }
    }
}

/// Executes query text against a workspace.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError>;
}
