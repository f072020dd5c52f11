//! Query execution: retry policy, the execution client and the typed
//! operations built on top of it.

mod client;
mod operations;
mod retry;

pub use client::QueryExecutor;
pub use operations::{IncidentQueries, IncidentRef};
pub use retry::RetryPolicy;
