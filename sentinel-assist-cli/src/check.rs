use sentinel_assist_core::AppConfig;
use sentinel_assist_core::backend::{BackendRequest, LogAnalyticsBackend, QueryBackend};
use sentinel_assist_core::model::{ModelRequest, ProviderFactory};
use sentinel_assist_core::types::ChatMessage;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const PROBE_QUERY: &str = "SecurityIncident | take 1";

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("model check failed: {0}")]
    Model(String),
    #[error("workspace check failed: {0}")]
    Workspace(String),
}

/// Connectivity check. Configuration has already been validated by the time
/// this runs; here the model and the workspace are each called once.
pub async fn run(config: &AppConfig) -> Result<(), CheckError> {
    println!("[ok] configuration");

    let provider = ProviderFactory::create(&config.model);
    let request = ModelRequest::new(
        &config.model.deployment,
        vec![ChatMessage::user("Reply with the single word: ready")],
    );
    provider
        .chat(request)
        .await
        .map_err(|err| CheckError::Model(err.user_message()))?;
    info!(provider = provider.id(), "Model reachable");
    println!("[ok] model {} ({})", config.model.deployment, provider.id());

    let backend = LogAnalyticsBackend::from_config(&config.workspace);
    let request = BackendRequest {
        query: PROBE_QUERY.to_string(),
        timeout: config.query.simple_timeout,
        timespan: Duration::from_secs(24 * 3_600),
    };
    let response = backend
        .query(&request)
        .await
        .map_err(|err| CheckError::Workspace(err.to_string()))?;
    info!(rows = response.rows().len(), "Workspace reachable");
    println!("[ok] workspace {}", config.workspace.id);
    Ok(())
}
