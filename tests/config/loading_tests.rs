// Config loading tests - file discovery, environment fallbacks and
// validation errors.

use sentinel_assist_core::config::{ConfigError, ModelKind, WorkspaceAuth, load_config};
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const ENV_VARS: [&str; 8] = [
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_API_KEY",
    "AZURE_OPENAI_CHAT_DEPLOYMENT",
    "SENTINEL_WORKSPACE_ID",
    "AZURE_TENANT_ID",
    "AZURE_CLIENT_ID",
    "AZURE_CLIENT_SECRET",
    "OPENAI_API_KEY",
];

fn clear_env() {
    for name in ENV_VARS {
        // SAFETY: tests touching the environment are serialised.
        unsafe { std::env::remove_var(name) };
    }
}

fn set_env(name: &str, value: &str) {
    // SAFETY: tests touching the environment are serialised.
    unsafe { std::env::set_var(name, value) };
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("sentinel.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
#[serial]
fn returns_error_when_file_not_found() {
    let result = load_config(Some(Path::new("/nonexistent/path/sentinel.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
#[serial]
fn environment_fills_fields_missing_from_file() {
    clear_env();
    set_env("AZURE_OPENAI_ENDPOINT", "https://env.openai.azure.com");
    set_env("AZURE_OPENAI_API_KEY", "env-key");
    set_env("AZURE_TENANT_ID", "tenant");
    set_env("AZURE_CLIENT_ID", "client");
    set_env("AZURE_CLIENT_SECRET", "secret");
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[workspace]
id = "workspace-from-file"
"#,
    );

    let config = load_config(Some(&path)).expect("valid config");
    clear_env();

    assert_eq!(config.model.kind, ModelKind::Azure);
    assert_eq!(config.model.endpoint, "https://env.openai.azure.com");
    assert_eq!(config.workspace.id, "workspace-from-file");
    assert!(matches!(
        config.workspace.auth,
        WorkspaceAuth::ClientCredentials { ref tenant_id, .. } if tenant_id == "tenant"
    ));
}

#[test]
#[serial]
fn placeholders_expand_from_environment() {
    clear_env();
    set_env("OPENAI_API_KEY", "sk-test");
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
type = "openai"
api_key = "${OPENAI_API_KEY}"
model = "gpt-4o-mini"

[workspace]
id = "ws"
access_token = "token"
"#,
    );

    let config = load_config(Some(&path)).expect("valid config");
    clear_env();

    assert_eq!(config.model.kind, ModelKind::OpenAi);
    assert_eq!(config.model.api_key, "sk-test");
    assert_eq!(config.model.deployment, "gpt-4o-mini");
}

#[test]
#[serial]
fn missing_fields_name_their_environment_variable() {
    clear_env();
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[agent]\nmax_turns = 10\n");

    let err = load_config(Some(&path)).unwrap_err();

    let ConfigError::MissingFields(fields) = &err else {
        panic!("expected missing fields, got {err:?}");
    };
    assert!(fields.iter().any(|field| field.contains("AZURE_OPENAI_ENDPOINT")));
    assert!(fields.iter().any(|field| field.contains("SENTINEL_WORKSPACE_ID")));
    assert!(err.user_message().contains("Missing required configuration"));
}

#[test]
#[serial]
fn knowledge_path_enables_the_knowledge_base() {
    clear_env();
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
endpoint = "https://example.openai.azure.com"
api_key = "key"

[workspace]
id = "ws"
access_token = "token"

[knowledge]
path = "config/knowledge.json"
low_confidence_distance = 0.5
"#,
    );

    let config = load_config(Some(&path)).expect("valid config");

    assert_eq!(
        config.knowledge.path.as_deref(),
        Some(Path::new("config/knowledge.json"))
    );
    assert_eq!(config.knowledge.low_confidence_distance, 0.5);
}
