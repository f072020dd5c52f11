pub mod app;
pub mod error;
pub mod loader;

pub use app::{
    AgentConfig, AppConfig, KnowledgeConfig, ModelConfig, ModelKind, QueryConfig, WorkspaceAuth,
    WorkspaceConfig,
};
pub use error::ConfigError;
pub use loader::{ensure_env_loaded, load_config, parse_config};
