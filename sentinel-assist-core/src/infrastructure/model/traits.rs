//! Model traits

use super::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;

/// Trait for model provider implementations
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider label used in logs and error messages
    fn id(&self) -> &str;

    /// Send one chat completion request
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}
