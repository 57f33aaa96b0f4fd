use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;

use super::credential::{expiry_with_margin, CredentialStore};
use crate::config::{DEFAULT_TOKEN_LIFETIME_SECS, MAX_TOKEN_LIFETIME_SECS};

/// Why a token refresh did not produce a new access token.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh credentials are not configured")]
    NotConfigured,

    #[error("accounts server returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("accounts server refused the refresh token: {0}")]
    Provider(String),

    #[error("accounts server request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Token endpoint response. Zoho answers some failures with 200 and an `error` field.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

/// Exchanges the refresh token for a new access token and writes it to the store.
///
/// Refreshes are single-flight: concurrent callers queue on one gate and a caller
/// that finds the token already replaced skips its own exchange.
#[derive(Debug)]
pub struct TokenRefresher {
    http: Client,
    token_url: String,
    store: Arc<CredentialStore>,
    gate: Mutex<()>,
}

impl TokenRefresher {
    pub fn new(http: Client, accounts_domain: &str, store: Arc<CredentialStore>) -> Self {
        Self {
            http,
            token_url: format!("{}/oauth/v2/token", accounts_domain.trim_end_matches('/')),
            store,
            gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Unconditionally exchange the refresh token.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let _guard = self.gate.lock().await;
        self.exchange().await
    }

    /// Refresh unless another caller already replaced `observed` with a fresh token
    /// while this one was waiting.
    pub async fn refresh_replacing(&self, observed: &str) -> Result<(), RefreshError> {
        let _guard = self.gate.lock().await;

        let current = self.store.snapshot();
        if current.value != observed && !current.is_stale(Utc::now()) {
            tracing::debug!("Token already refreshed by a concurrent request");
            return Ok(());
        }

        self.exchange().await
    }

    async fn exchange(&self) -> Result<(), RefreshError> {
        let Some(creds) = self.store.refresh_credentials() else {
            tracing::warn!("Access token needs refreshing but no refresh credentials are configured");
            return Err(RefreshError::NotConfigured);
        };

        tracing::debug!("Refreshing Zoho access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("refresh_token", creds.refresh_token.as_str()),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Token refresh rejected with {}", status);
            return Err(RefreshError::Rejected { status, body });
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RefreshError::Provider(format!("malformed token response: {}", e)))?;

        let access_token = match (token.access_token, token.error) {
            (Some(access_token), _) if !access_token.is_empty() => access_token,
            (_, Some(error)) => {
                tracing::warn!("Token refresh refused: {}", error);
                return Err(RefreshError::Provider(error));
            }
            _ => {
                return Err(RefreshError::Provider(
                    "token response had no access_token".to_string(),
                ))
            }
        };

        let lifetime = token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let expires_at = Some(lifetime)
            .filter(|secs| (0..=MAX_TOKEN_LIFETIME_SECS).contains(secs))
            .and_then(|secs| expiry_with_margin(Utc::now(), secs))
            .ok_or_else(|| {
                tracing::warn!("Token refresh returned out-of-range expires_in {}", lifetime);
                RefreshError::Provider(format!("expires_in out of range: {}", lifetime))
            })?;
        self.store.replace(access_token, expires_at);

        tracing::info!("Zoho access token refreshed, valid until {}", expires_at);
        Ok(())
    }
}
