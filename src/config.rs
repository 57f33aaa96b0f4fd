//! Runtime configuration loaded from environment variables.
//!
//! - `ZOHO_ACCESS_TOKEN` - Initial access token (optional if refresh credentials are set)
//! - `ZOHO_ACCESS_TOKEN_EXPIRES_IN` - Lifetime of the supplied token in seconds (default: 3600)
//! - `ZOHO_PORTAL_ID` - Portal id used in every portal-scoped path (required)
//! - `ZOHO_DATA_CENTER` - Region suffix: com, eu, in, com.au, jp, ca, com.cn, sa (default: com)
//! - `ZOHO_API_DOMAIN` - Overrides the region's API domain
//! - `ZOHO_ACCOUNTS_DOMAIN` - Overrides the region's accounts domain
//! - `ZOHO_DOWNLOAD_DOMAINS` - Comma-separated hosts trusted for file downloads besides the API domain
//! - `ZOHO_REFRESH_TOKEN`, `ZOHO_CLIENT_ID`, `ZOHO_CLIENT_SECRET` - Refresh credentials

use std::fmt;

use thiserror::Error;

use crate::auth::{redact, RefreshCredentials};

/// Lifetime Zoho assigns to access tokens.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Longest token lifetime we accept from configuration or the accounts server (one year).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

const DATA_CENTERS: &[&str] = &["com", "eu", "in", "com.au", "jp", "ca", "com.cn", "sa"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Unknown ZOHO_DATA_CENTER '{0}'. Must be one of: com, eu, in, com.au, jp, ca, com.cn, sa")]
    UnknownDataCenter(String),

    #[error("{name} must be a number of seconds between 0 and one year, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct ZohoConfig {
    pub access_token: String,
    pub token_lifetime_secs: i64,
    pub portal_id: String,
    pub api_domain: String,
    pub accounts_domain: String,
    /// Hosts besides `api_domain` that may receive the token on binary downloads.
    pub download_domains: Vec<String>,
    pub refresh: Option<RefreshCredentials>,
}

impl fmt::Debug for ZohoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZohoConfig")
            .field("access_token", &redact(&self.access_token))
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .field("portal_id", &self.portal_id)
            .field("api_domain", &self.api_domain)
            .field("accounts_domain", &self.accounts_domain)
            .field("download_domains", &self.download_domains)
            .field("refresh", &self.refresh)
            .finish()
    }
}

impl ZohoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let portal_id = get("ZOHO_PORTAL_ID").ok_or(ConfigError::Missing("ZOHO_PORTAL_ID"))?;

        let data_center = get("ZOHO_DATA_CENTER").unwrap_or_else(|| "com".to_string());
        if !DATA_CENTERS.contains(&data_center.as_str()) {
            return Err(ConfigError::UnknownDataCenter(data_center));
        }

        let api_domain = get("ZOHO_API_DOMAIN")
            .unwrap_or_else(|| format!("https://projectsapi.zoho.{}", data_center));
        let accounts_domain = get("ZOHO_ACCOUNTS_DOMAIN")
            .unwrap_or_else(|| format!("https://accounts.zoho.{}", data_center));

        let download_domains = match get("ZOHO_DOWNLOAD_DOMAINS") {
            Some(list) => list
                .split(',')
                .map(|d| d.trim().trim_end_matches('/').to_string())
                .filter(|d| !d.is_empty())
                .collect(),
            None => vec![
                format!("https://download.zoho.{}", data_center),
                format!("https://projects.zoho.{}", data_center),
            ],
        };

        let token_lifetime_secs = match get("ZOHO_ACCESS_TOKEN_EXPIRES_IN") {
            Some(value) => match value.parse::<i64>() {
                Ok(secs) if (0..=MAX_TOKEN_LIFETIME_SECS).contains(&secs) => secs,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "ZOHO_ACCESS_TOKEN_EXPIRES_IN",
                        value,
                    })
                }
            },
            None => DEFAULT_TOKEN_LIFETIME_SECS,
        };

        let refresh = match (
            get("ZOHO_REFRESH_TOKEN"),
            get("ZOHO_CLIENT_ID"),
            get("ZOHO_CLIENT_SECRET"),
        ) {
            (Some(refresh_token), Some(client_id), Some(client_secret)) => {
                Some(RefreshCredentials {
                    refresh_token,
                    client_id,
                    client_secret,
                })
            }
            (None, None, None) => None,
            _ => {
                tracing::warn!(
                    "Incomplete refresh credentials: ZOHO_REFRESH_TOKEN, ZOHO_CLIENT_ID and ZOHO_CLIENT_SECRET must all be set; token refresh disabled"
                );
                None
            }
        };

        Ok(Self {
            access_token: get("ZOHO_ACCESS_TOKEN").unwrap_or_default(),
            token_lifetime_secs,
            portal_id,
            api_domain: api_domain.trim_end_matches('/').to_string(),
            accounts_domain: accounts_domain.trim_end_matches('/').to_string(),
            download_domains,
            refresh,
        })
    }
}
