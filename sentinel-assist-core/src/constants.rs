//! Application constants
//!
//! Single source of truth for paths and tuning defaults.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/sentinel.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Default number of model/tool rounds per user turn
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// Default number of user/assistant exchanges retained in memory
pub const DEFAULT_MAX_TURNS: usize = 30;

/// Default backend timeout for point lookups and short lists
pub const DEFAULT_SIMPLE_TIMEOUT_SECS: u64 = 60;

/// Aggregation templates get this multiple of the simple timeout
pub const AGGREGATION_TIMEOUT_FACTOR: u32 = 3;

/// Total attempts made by the execution client for transient failures
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// First backoff delay; doubles on every further retry
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

/// Longest single delay between retries
pub const MAX_BACKOFF_SECS: u64 = 60;

/// Extra time past the server-side wait before the client gives up on a query
pub const QUERY_TIMEOUT_SLACK_SECS: u64 = 5;

/// Distance above which a knowledge base match is flagged as low confidence
pub const DEFAULT_LOW_CONFIDENCE_DISTANCE: f32 = 0.35;

/// Backend error messages are cut to this many characters before reaching the model
pub const MAX_ERROR_MESSAGE_CHARS: usize = 500;

pub const DEFAULT_CHAT_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";
pub const DEFAULT_LOG_ANALYTICS_ENDPOINT: &str = "https://api.loganalytics.io";
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const LOG_ANALYTICS_SCOPE: &str = "https://api.loganalytics.io/.default";
