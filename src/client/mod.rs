//! Authenticated HTTP client for the Zoho Projects API.
//!
//! Every outbound call goes through one private `execute` routine, which refreshes a stale
//! token before sending and retries exactly once after a 401.

mod download;

pub use download::resolve_download_url;

use download::origin_of;

use std::sync::Arc;

use chrono::Utc;
use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::auth::{CredentialStore, RefreshError, TokenRefresher};
use crate::config::ZohoConfig;

/// Errors returned by [`ZohoClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No Zoho access token available: set ZOHO_ACCESS_TOKEN or ZOHO_REFRESH_TOKEN, ZOHO_CLIENT_ID and ZOHO_CLIENT_SECRET")]
    MissingCredential,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[from] RefreshError),

    #[error("Zoho API returned {status}: {body}")]
    RemoteApi { status: StatusCode, body: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Zoho API returned invalid JSON: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Cannot download '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Refusing to send Zoho credentials to untrusted origin {0}")]
    UntrustedUrl(String),
}

impl ClientError {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::RefreshFailed(_) => "refresh_failed",
            Self::RemoteApi { .. } => "remote_api",
            Self::Transport(_) => "transport",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::UntrustedUrl(_) => "untrusted_url",
        }
    }
}

/// One logical API call: verb, path under `/api/v3`, query pairs and optional body.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Only mutating verbs carry a body.
    fn sends_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }
}

/// Raw bytes downloaded from Zoho along with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retry,
}

/// HTTP client for Zoho Projects.
#[derive(Debug, Clone)]
pub struct ZohoClient {
    http: Client,
    api_domain: String,
    base_url: String,
    /// Origins that may receive the bearer token on binary downloads.
    trusted_origins: Vec<String>,
    refresher: Arc<TokenRefresher>,
}

impl ZohoClient {
    /// Create a client from loaded configuration.
    pub fn from_config(config: &ZohoConfig) -> Self {
        let store = Arc::new(CredentialStore::from_startup(
            config.access_token.clone(),
            config.token_lifetime_secs,
            config.refresh.clone(),
        ));
        Self::new(&config.api_domain, &config.accounts_domain, store)
            .with_download_domains(config.download_domains.as_slice())
    }

    /// Create with an explicit credential store. Only the API domain is trusted for downloads.
    pub fn new(api_domain: &str, accounts_domain: &str, store: Arc<CredentialStore>) -> Self {
        let http = Client::new();
        let api_domain = api_domain.trim_end_matches('/').to_string();
        Self {
            refresher: Arc::new(TokenRefresher::new(http.clone(), accounts_domain, store)),
            base_url: format!("{}/api/v3", api_domain),
            trusted_origins: origin_of(&api_domain).into_iter().collect(),
            api_domain,
            http,
        }
    }

    /// Also trust these domains (e.g. the regional download host) for binary downloads.
    pub fn with_download_domains<S: AsRef<str>>(mut self, domains: &[S]) -> Self {
        for domain in domains {
            match origin_of(domain.as_ref()) {
                Some(origin) if !self.trusted_origins.contains(&origin) => {
                    self.trusted_origins.push(origin)
                }
                Some(_) => {}
                None => tracing::warn!("Ignoring unparseable download domain '{}'", domain.as_ref()),
            }
        }
        self
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        self.refresher.store()
    }

    /// Force a token exchange regardless of staleness.
    pub async fn refresh_token(&self) -> Result<(), ClientError> {
        Ok(self.refresher.refresh().await?)
    }

    /// Issue a JSON API call. An empty success body yields `Value::Null`.
    pub async fn dispatch(&self, endpoint: Endpoint) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        tracing::debug!("{} {}", endpoint.method, endpoint.path);

        let response = self
            .execute(|| {
                let mut req = self
                    .http
                    .request(endpoint.method.clone(), &url)
                    .header(header::CONTENT_TYPE, "application/json");
                if !endpoint.query.is_empty() {
                    req = req.query(&endpoint.query);
                }
                if let Some(body) = endpoint.body.as_ref().filter(|_| endpoint.sends_body()) {
                    req = req.json(body);
                }
                req
            })
            .await?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Download raw bytes from a Zoho-hosted URL (inline images, attachments).
    ///
    /// The URL must resolve to a trusted origin; anything else is refused before a
    /// request is built.
    pub async fn fetch_binary(&self, url: &str) -> Result<BinaryContent, ClientError> {
        let url = resolve_download_url(url, &self.api_domain)?;
        let origin = url.origin().ascii_serialization();
        if !self.trusted_origins.contains(&origin) {
            tracing::warn!("Refusing binary download from untrusted origin {}", origin);
            return Err(ClientError::UntrustedUrl(origin));
        }
        tracing::debug!("GET (binary) {}", url);

        let response = self.execute(|| self.http.get(url.clone())).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = response.bytes().await?.to_vec();

        Ok(BinaryContent {
            bytes,
            content_type,
        })
    }

    /// Send an authenticated request built by `build`, handling freshness and the single
    /// 401 retry. Returns the successful response or `RemoteApi` with the final status.
    async fn execute<F>(&self, build: F) -> Result<reqwest::Response, ClientError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let store = self.refresher.store();

        let current = store.snapshot();
        if current.is_stale(Utc::now()) {
            if let Err(e) = self.refresher.refresh_replacing(&current.value).await {
                tracing::warn!("Proactive token refresh failed, using stored token: {}", e);
            }
        }

        let mut attempt = Attempt::Initial;
        let response = loop {
            let token = store.snapshot().value;
            if token.is_empty() {
                return Err(ClientError::MissingCredential);
            }

            let response = build()
                .header(header::AUTHORIZATION, format!("Zoho-oauthtoken {}", token))
                .send()
                .await?;

            if response.status() != StatusCode::UNAUTHORIZED
                || attempt == Attempt::Retry
                || !store.can_refresh()
            {
                break response;
            }

            match self.refresher.refresh_replacing(&token).await {
                Ok(()) => {
                    tracing::info!("Zoho rejected the access token, retrying with a refreshed one");
                    attempt = Attempt::Retry;
                }
                Err(e) => {
                    tracing::warn!("Token refresh after 401 failed: {}", e);
                    break response;
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::RemoteApi { status, body })
        }
    }
}
