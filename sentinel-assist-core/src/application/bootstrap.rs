//! Wiring from a validated [`AppConfig`] to a ready [`Orchestrator`].

use super::agent::{AgentOptions, Orchestrator};
use super::execution::{IncidentQueries, QueryExecutor, RetryPolicy};
use super::tooling::ToolDispatcher;
use crate::config::AppConfig;
use crate::infrastructure::backend::{LogAnalyticsBackend, QueryBackend};
use crate::infrastructure::knowledge::{KnowledgeBase, KnowledgeError, LexicalKnowledgeBase};
use crate::infrastructure::model::ProviderFactory;
use crate::query::TemplateRegistry;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}

impl BootstrapError {
    pub fn user_message(&self) -> String {
        match self {
            BootstrapError::Knowledge(err) => format!("Knowledge base could not be loaded: {err}"),
        }
    }
}

/// Build the dispatch table over `backend`, attaching the knowledge base
/// when one is configured.
pub fn build_dispatcher(
    config: &AppConfig,
    backend: Arc<dyn QueryBackend>,
) -> Result<Arc<ToolDispatcher>, BootstrapError> {
    let registry = Arc::new(TemplateRegistry::with_limits(
        config.query.simple_timeout,
        &config.query.limits,
    ));
    let retry = RetryPolicy::new(config.query.max_attempts, config.query.backoff_base);
    let queries = IncidentQueries::new(registry, QueryExecutor::new(backend, retry));

    let dispatcher = match &config.knowledge.path {
        Some(path) => {
            let knowledge = LexicalKnowledgeBase::load(path)?;
            let (incidents, playbooks) = knowledge.counts();
            info!(path = %path.display(), incidents, playbooks, "Knowledge base loaded");
            ToolDispatcher::with_knowledge(
                queries,
                Arc::new(knowledge),
                config.knowledge.low_confidence_distance,
            )
        }
        None => ToolDispatcher::new(queries),
    };
    info!(tools = dispatcher.tool_names().len(), "Tool dispatcher ready");
    Ok(Arc::new(dispatcher))
}

/// Build the orchestrator against the configured model and workspace.
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, BootstrapError> {
    let backend: Arc<dyn QueryBackend> = Arc::new(LogAnalyticsBackend::from_config(&config.workspace));
    let dispatcher = build_dispatcher(config, backend)?;
    let provider = ProviderFactory::create(&config.model);
    let options = AgentOptions {
        model: config.model.deployment.clone(),
        max_tool_rounds: config.agent.max_tool_rounds,
        max_turns: config.agent.max_turns,
    };
    Ok(Orchestrator::new(provider, dispatcher, options))
}
