//! # Sentinel Assist core
//!
//! Natural-language questions about Sentinel incidents, answered by a language
//! model that may only reach the workspace through a fixed set of read-only
//! query templates.
//!
//! ## Layers
//!
//! - [`query`] - time/severity resolver, template registry and builder
//! - [`application::execution`] - execution client with retry and partial handling
//! - [`application::projection`] - view projection and result envelopes
//! - [`application::tooling`] - the tool dispatch table exposed to the model
//! - [`application::agent`] - the round-bounded orchestration loop
//! - [`infrastructure`] - HTTP clients for the model, the workspace and the knowledge base

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod query;

pub use application::agent::{
    AgentError, AgentOptions, Orchestrator, ProgressEvent, ToolInvocation, TurnOutcome,
};
pub use application::bootstrap::{BootstrapError, build_dispatcher, build_orchestrator};
pub use application::tooling::ToolDispatcher;
pub use config::{AppConfig, ConfigError};
pub use domain::outcome::{QueryError, QueryMetadata, QueryOutcome, QueryResult};
pub use domain::types;
pub use infrastructure::{backend, knowledge, model};
