use crate::query::LimitPolicy;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Azure OpenAI deployment, `api-key` header.
    Azure,
    /// OpenAI-compatible chat completions, bearer token.
    OpenAi,
}

impl ModelKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "azure" | "azure-openai" | "azure_openai" => Some(ModelKind::Azure),
            "openai" | "openai-compatible" => Some(ModelKind::OpenAi),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Azure => "azure",
            ModelKind::OpenAi => "openai",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub kind: ModelKind,
    pub endpoint: String,
    pub api_key: String,
    /// Deployment name for Azure, model id otherwise.
    pub deployment: String,
    pub api_version: String,
    pub api_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceAuth {
    /// Pre-acquired bearer token.
    Token(String),
    /// Service principal, exchanged for a token on demand.
    ClientCredentials {
        tenant_id: String,
        client_id: String,
        client_secret: String,
        authority: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub id: String,
    pub endpoint: String,
    pub auth: WorkspaceAuth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    pub max_tool_rounds: usize,
    pub max_turns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub simple_timeout: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub limits: HashMap<String, LimitPolicy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeConfig {
    pub path: Option<PathBuf>,
    pub low_confidence_distance: f32,
}

/// Validated application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub workspace: WorkspaceConfig,
    pub agent: AgentConfig,
    pub query: QueryConfig,
    pub knowledge: KnowledgeConfig,
}
