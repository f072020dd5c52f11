//! Workspace query backend
//!
//! - `types` - request/response shapes, backend errors and the `QueryBackend` trait
//! - `auth` - bearer token acquisition for the workspace API
//! - `log_analytics` - HTTP client for the Log Analytics query API

pub mod auth;
pub mod log_analytics;
pub mod types;

pub use auth::TokenSource;
pub use log_analytics::LogAnalyticsBackend;
pub use types::{BackendError, BackendRequest, BackendResponse, QueryBackend};
