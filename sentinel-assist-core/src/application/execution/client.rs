use super::retry::RetryPolicy;
use crate::constants::QUERY_TIMEOUT_SLACK_SECS;
use crate::domain::outcome::{QueryError, QueryMetadata, QueryOutcome, QueryResult};
use crate::domain::records::Record;
use crate::infrastructure::backend::{BackendError, BackendRequest, BackendResponse, QueryBackend};
use crate::query::BuiltQuery;
use backoff::backoff::Backoff;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Runs built queries against the backend and classifies the answer.
///
/// Only transient failures are retried. A partial answer is returned as-is;
/// narrowing the request is the caller's decision.
#[derive(Clone)]
pub struct QueryExecutor {
    backend: Arc<dyn QueryBackend>,
    retry: RetryPolicy,
}

impl QueryExecutor {
    pub fn new(backend: Arc<dyn QueryBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub async fn execute(&self, query: &BuiltQuery) -> QueryOutcome<Record> {
        let request = BackendRequest {
            query: query.text.clone(),
            timeout: query.timeout,
            timespan: query.timespan,
        };

        // Backstop for backends without their own deadline. The server's own
        // wait limit and the HTTP client's deadline both fire before this.
        let deadline = query.timeout + Duration::from_secs(2 * QUERY_TIMEOUT_SLACK_SECS);
        let mut schedule = self.retry.schedule();
        let mut attempt = 1;
        loop {
            let started = Instant::now();
            let answer = match tokio::time::timeout(deadline, self.backend.query(&request)).await {
                Ok(answer) => answer,
                Err(_) => Err(BackendError::Timeout(query.timeout)),
            };
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            let retries = attempt - 1;

            let err = match answer {
                Ok(response) => {
                    let result = into_result(response, query.limit, elapsed_ms, retries);
                    info!(
                        template = query.template,
                        attempt,
                        elapsed_ms,
                        total = result.metadata.total,
                        truncated = result.metadata.truncated,
                        "Query completed"
                    );
                    return QueryOutcome::Result(result);
                }
                Err(err) => err,
            };

            let retry_after = if err.is_transient() && attempt < self.retry.max_attempts {
                schedule.next_backoff()
            } else {
                None
            };
            if let Some(delay) = retry_after {
                warn!(
                    template = query.template,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient query failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            warn!(
                template = query.template,
                attempt,
                code = err.code(),
                error = %err,
                "Query failed"
            );
            return QueryError::new(err.code(), err.to_string(), err.is_transient())
                .with_retries(retries)
                .into();
        }
    }
}

fn into_result(
    response: BackendResponse,
    limit: Option<u32>,
    elapsed_ms: f64,
    retries: u32,
) -> QueryResult<Record> {
    let (mut rows, partial_error) = match response {
        BackendResponse::Complete { rows } => (rows, None),
        BackendResponse::Partial { rows, detail } => (rows, Some(detail)),
    };
    let total = rows.len();
    let mut truncated = partial_error.is_some();
    if let Some(cap) = limit.map(|cap| cap as usize) {
        if rows.len() > cap {
            debug!(total, cap, "Applying client-side row cap");
            rows.truncate(cap);
            truncated = true;
        }
    }
    QueryResult {
        metadata: QueryMetadata {
            total,
            query_ms: elapsed_ms,
            truncated,
            partial_error,
        },
        results: rows,
        retries,
    }
}
