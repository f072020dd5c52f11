//! Azure OpenAI client implementation

use async_trait::async_trait;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ModelConfig;
use crate::infrastructure::model::adapter::{ChatCompletionResponse, MessageAdapter};
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};

/// Azure OpenAI deployment client. The deployment is part of the URL, so
/// `ModelRequest::model` is only used for logging.
#[derive(Clone)]
pub struct AzureOpenAIClient {
    base: HttpClientBase,
    api_path: String,
}

impl AzureOpenAIClient {
    pub fn from_config(config: &ModelConfig) -> Self {
        let api_path = config.api_path.clone().unwrap_or_else(|| {
            format!(
                "/openai/deployments/{}/chat/completions?api-version={}",
                config.deployment, config.api_version
            )
        });
        Self {
            base: HttpClientBase::new(
                "azure".to_string(),
                config.endpoint.clone(),
                Some(config.api_key.clone()),
            ),
            api_path,
        }
    }

    pub fn api_path(&self) -> &str {
        &self.api_path
    }
}

#[async_trait]
impl ModelProvider for AzureOpenAIClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&self.api_path);
        let payload = MessageAdapter::to_openai_request(&request, false);

        info!(
            provider = self.base.id.as_str(),
            deployment = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            tool_choice = request.tool_choice.as_str(),
            "Sending request to Azure OpenAI"
        );

        let response: ChatCompletionResponse = self.base.post_with_api_key(&url, &payload).await?;
        debug!("Received response from Azure OpenAI");

        MessageAdapter::from_openai_response(&self.base.id, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelKind;

    #[test]
    fn deployment_and_version_land_in_the_path() {
        let config = ModelConfig {
            kind: ModelKind::Azure,
            endpoint: "https://example.openai.azure.com".into(),
            api_key: "key".into(),
            deployment: "gpt-4o".into(),
            api_version: "2024-10-21".into(),
            api_path: None,
        };
        let client = AzureOpenAIClient::from_config(&config);
        assert_eq!(
            client.api_path(),
            "/openai/deployments/gpt-4o/chat/completions?api-version=2024-10-21"
        );
    }
}
