//! Provider factory - creates clients from config

use super::clients::{AzureOpenAIClient, OpenAIClient};
use super::traits::ModelProvider;
use crate::config::{ModelConfig, ModelKind};
use std::sync::Arc;
use tracing::debug;

/// Factory for creating model clients from the model config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a model client based on the configured type.
    ///
    /// Supported types:
    /// - `azure` → Azure OpenAI deployment (`api-key` header)
    /// - `openai` → OpenAI-compatible chat completions (bearer token)
    pub fn create(config: &ModelConfig) -> Arc<dyn ModelProvider> {
        debug!(kind = config.kind.as_str(), endpoint = %config.endpoint, "Creating model client");
        match config.kind {
            ModelKind::Azure => Arc::new(AzureOpenAIClient::from_config(config)),
            ModelKind::OpenAi => Arc::new(OpenAIClient::from_config(config)),
        }
    }
}
