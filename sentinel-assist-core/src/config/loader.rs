use super::app::{
    AgentConfig, AppConfig, KnowledgeConfig, ModelConfig, ModelKind, QueryConfig, WorkspaceAuth,
    WorkspaceConfig,
};
use super::error::ConfigError;
use crate::constants::{
    CONFIG_PATH, DEFAULT_AUTHORITY, DEFAULT_AZURE_API_VERSION, DEFAULT_BACKOFF_BASE_MS,
    DEFAULT_CHAT_DEPLOYMENT, DEFAULT_LOG_ANALYTICS_ENDPOINT, DEFAULT_LOW_CONFIDENCE_DISTANCE,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_MAX_TURNS, DEFAULT_SIMPLE_TIMEOUT_SECS,
    ENV_PATH,
};
use crate::query::LimitPolicy;
use dotenvy::from_filename;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, warn};

static ENV_LOADER: Once = Once::new();

const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    model: RawModel,
    workspace: RawWorkspace,
    agent: RawAgent,
    query: RawQuery,
    knowledge: RawKnowledge,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawModel {
    #[serde(rename = "type")]
    kind: Option<String>,
    endpoint: Option<String>,
    api_key: Option<String>,
    #[serde(alias = "model")]
    deployment: Option<String>,
    api_version: Option<String>,
    api_path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawWorkspace {
    id: Option<String>,
    endpoint: Option<String>,
    access_token: Option<String>,
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    authority: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawAgent {
    max_tool_rounds: Option<usize>,
    max_turns: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawQuery {
    simple_timeout_secs: Option<u64>,
    max_attempts: Option<u32>,
    backoff_base_ms: Option<u64>,
    limits: HashMap<String, RawLimit>,
}

#[derive(Debug, Deserialize)]
struct RawLimit {
    default: u32,
    max: u32,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawKnowledge {
    path: Option<PathBuf>,
    low_confidence_distance: Option<f32>,
}

/// Ensures environment variables are loaded from config/.env, then .env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
        let _ = dotenvy::dotenv();
    });
}

/// Load and validate configuration.
///
/// A missing file at the default path is not an error: every field then
/// comes from the environment. An explicitly requested path must exist.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(|| Path::new(CONFIG_PATH));
    debug!(path = %config_path.display(), "Reading configuration file");

    match fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            if explicit {
                Err(ConfigError::NotFound {
                    path: config_path.to_path_buf(),
                })
            } else {
                debug!("No configuration file, using environment only");
                validate_and_build(RawConfig::default())
            }
        }
        Err(source) => Err(ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        }),
    }
}

/// Parse and validate TOML content. Environment fallbacks still apply.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let parsed: RawConfig =
        toml::from_str(content).map_err(|source| ConfigError::Parse { source })?;
    validate_and_build(parsed)
}

/// Collects every missing required field before failing.
#[derive(Default)]
struct Collector {
    missing: Vec<String>,
}

impl Collector {
    /// Resolve a field from its TOML value, falling back to `env_var`.
    /// `${VAR}` references are expanded; an unset reference counts as missing.
    fn field(&mut self, field: &str, raw: Option<String>, env_var: Option<&str>) -> Option<String> {
        let value = match raw {
            Some(raw) => expand(field, &raw),
            None => env_var.and_then(|name| env::var(name).ok()),
        };
        value.filter(|value| !value.trim().is_empty())
    }

    fn required(&mut self, field: &str, raw: Option<String>, env_var: Option<&str>) -> String {
        match self.field(field, raw, env_var) {
            Some(value) => value,
            None => {
                self.missing.push(match env_var {
                    Some(name) => format!("{field} ({name})"),
                    None => field.to_string(),
                });
                String::new()
            }
        }
    }
}

fn expand(field: &str, raw: &str) -> Option<String> {
    match shellexpand::env(raw) {
        Ok(value) => Some(value.into_owned()),
        Err(err) => {
            warn!(field, %err, "Configuration value references an unset variable");
            None
        }
    }
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let mut fields = Collector::default();

    let kind = match parsed.model.kind.as_deref() {
        None => ModelKind::Azure,
        Some(raw) => ModelKind::parse(raw)
            .ok_or_else(|| ConfigError::invalid("model.type", format!("unknown model type '{raw}'")))?,
    };
    let model = match kind {
        ModelKind::Azure => ModelConfig {
            kind,
            endpoint: fields.required("model.endpoint", parsed.model.endpoint, Some("AZURE_OPENAI_ENDPOINT")),
            api_key: fields.required("model.api_key", parsed.model.api_key, Some("AZURE_OPENAI_API_KEY")),
            deployment: fields
                .field("model.deployment", parsed.model.deployment, Some("AZURE_OPENAI_CHAT_DEPLOYMENT"))
                .unwrap_or_else(|| DEFAULT_CHAT_DEPLOYMENT.to_string()),
            api_version: fields
                .field("model.api_version", parsed.model.api_version, Some("AZURE_OPENAI_API_VERSION"))
                .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            api_path: fields.field("model.api_path", parsed.model.api_path, None),
        },
        ModelKind::OpenAi => ModelConfig {
            kind,
            endpoint: fields
                .field("model.endpoint", parsed.model.endpoint, Some("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string()),
            api_key: fields.required("model.api_key", parsed.model.api_key, Some("OPENAI_API_KEY")),
            deployment: fields
                .field("model.deployment", parsed.model.deployment, Some("OPENAI_MODEL"))
                .unwrap_or_else(|| DEFAULT_CHAT_DEPLOYMENT.to_string()),
            api_version: String::new(),
            api_path: fields.field("model.api_path", parsed.model.api_path, None),
        },
    };

    let raw_ws = parsed.workspace;
    let workspace_id = fields.required("workspace.id", raw_ws.id, Some("SENTINEL_WORKSPACE_ID"));
    let endpoint = fields
        .field("workspace.endpoint", raw_ws.endpoint, None)
        .unwrap_or_else(|| DEFAULT_LOG_ANALYTICS_ENDPOINT.to_string());
    let auth = match fields.field("workspace.access_token", raw_ws.access_token, None) {
        Some(token) => WorkspaceAuth::Token(token),
        None => WorkspaceAuth::ClientCredentials {
            tenant_id: fields.required("workspace.tenant_id", raw_ws.tenant_id, Some("AZURE_TENANT_ID")),
            client_id: fields.required("workspace.client_id", raw_ws.client_id, Some("AZURE_CLIENT_ID")),
            client_secret: fields.required(
                "workspace.client_secret",
                raw_ws.client_secret,
                Some("AZURE_CLIENT_SECRET"),
            ),
            authority: fields
                .field("workspace.authority", raw_ws.authority, None)
                .unwrap_or_else(|| DEFAULT_AUTHORITY.to_string()),
        },
    };

    if !fields.missing.is_empty() {
        return Err(ConfigError::MissingFields(fields.missing));
    }

    let agent = AgentConfig {
        max_tool_rounds: positive(
            "agent.max_tool_rounds",
            parsed.agent.max_tool_rounds.unwrap_or(DEFAULT_MAX_TOOL_ROUNDS),
        )?,
        max_turns: positive("agent.max_turns", parsed.agent.max_turns.unwrap_or(DEFAULT_MAX_TURNS))?,
    };

    let mut limits = HashMap::new();
    for (template, raw) in parsed.query.limits {
        let field = format!("query.limits.{template}");
        if raw.max == 0 || raw.default == 0 {
            return Err(ConfigError::invalid(field, "limits must be at least 1"));
        }
        if raw.default > raw.max {
            return Err(ConfigError::invalid(field, "default exceeds max"));
        }
        limits.insert(template, LimitPolicy::new(raw.default, raw.max));
    }

    let query = QueryConfig {
        simple_timeout: Duration::from_secs(positive(
            "query.simple_timeout_secs",
            parsed.query.simple_timeout_secs.unwrap_or(DEFAULT_SIMPLE_TIMEOUT_SECS),
        )?),
        max_attempts: positive(
            "query.max_attempts",
            parsed.query.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
        )?,
        backoff_base: Duration::from_millis(
            parsed.query.backoff_base_ms.unwrap_or(DEFAULT_BACKOFF_BASE_MS),
        ),
        limits,
    };

    let low_confidence_distance = parsed
        .knowledge
        .low_confidence_distance
        .unwrap_or(DEFAULT_LOW_CONFIDENCE_DISTANCE);
    if !low_confidence_distance.is_finite() || low_confidence_distance < 0.0 {
        return Err(ConfigError::invalid(
            "knowledge.low_confidence_distance",
            "must be a non-negative number",
        ));
    }

    Ok(AppConfig {
        model,
        workspace: WorkspaceConfig {
            id: workspace_id,
            endpoint,
            auth,
        },
        agent,
        query,
        knowledge: KnowledgeConfig {
            path: parsed.knowledge.path,
            low_confidence_distance,
        },
    })
}

fn positive<T: Default + PartialEq>(field: &str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        Err(ConfigError::invalid(field, "must be greater than zero"))
    } else {
        Ok(value)
    }
}
