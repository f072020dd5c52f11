//! OpenAI-compatible client implementation

use async_trait::async_trait;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ModelConfig;
use crate::infrastructure::model::adapter::{ChatCompletionResponse, MessageAdapter};
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};

const DEFAULT_API_PATH: &str = "/v1/chat/completions";

/// OpenAI-compatible client (OpenAI, and any gateway exposing chat completions)
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    api_path: String,
}

impl OpenAIClient {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            base: HttpClientBase::new(
                "openai".to_string(),
                config.endpoint.clone(),
                Some(config.api_key.clone()),
            ),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| DEFAULT_API_PATH.to_string()),
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAIClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&self.api_path);
        let payload = MessageAdapter::to_openai_request(&request, true);

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: ChatCompletionResponse = self.base.post_with_bearer(&url, &payload).await?;
        debug!("Received response from OpenAI-compatible provider");

        MessageAdapter::from_openai_response(&self.base.id, response)
    }
}
