use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required configuration: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Multi-line message for the terminal.
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::MissingFields(fields) => {
                let mut message = String::from("Missing required configuration:\n");
                for field in fields {
                    message.push_str("  - ");
                    message.push_str(field);
                    message.push('\n');
                }
                message.push_str("Set them in config/sentinel.toml or config/.env.");
                message
            }
            other => other.to_string(),
        }
    }
}
