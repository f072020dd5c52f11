use super::types::BackendError;
use crate::config::WorkspaceAuth;
use crate::constants::LOG_ANALYTICS_SCOPE;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Supplies bearer tokens for the workspace API.
pub struct TokenSource {
    auth: WorkspaceAuth,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    3_600
}

impl TokenSource {
    pub fn new(auth: WorkspaceAuth, http: Client) -> Self {
        Self {
            auth,
            http,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid token, requesting a new one when the cached token is
    /// missing or about to expire.
    pub async fn token(&self) -> Result<String, BackendError> {
        let (tenant_id, client_id, client_secret, authority) = match &self.auth {
            WorkspaceAuth::Token(token) => return Ok(token.clone()),
            WorkspaceAuth::ClientCredentials {
                tenant_id,
                client_id,
                client_secret,
                authority,
            } => (tenant_id, client_id, client_secret, authority),
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
            debug!("Workspace token is about to expire, refreshing");
        }

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            authority.trim_end_matches('/'),
            tenant_id
        );
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("scope", LOG_ANALYTICS_SCOPE),
        ];
        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|err| BackendError::Auth(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Auth(format!("HTTP {}: {body}", status.as_u16())));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| BackendError::Auth(err.to_string()))?;

        info!(expires_in = token.expires_in, "Acquired workspace token");
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }
}
