use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, TimeDelta, Utc};

/// Seconds subtracted from every token lifetime so a token never reads as fresh
/// right up to the moment Zoho stops accepting it.
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// Placeholder printed instead of a secret in `Debug` output.
pub fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// Material needed to exchange a refresh token for a new access token.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshCredentials {
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for RefreshCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCredentials")
            .field("refresh_token", &redact(&self.refresh_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .finish()
    }
}

/// A bearer token together with the instant it must be treated as stale.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &redact(&self.value))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// An empty token is always stale, whatever its expiry says.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.value.is_empty() || now >= self.expires_at
    }
}

/// Expiry for a token that Zoho says lives `lifetime_secs` from `now`, with the margin applied.
///
/// `None` when the result falls outside the representable time range.
pub fn expiry_with_margin(now: DateTime<Utc>, lifetime_secs: i64) -> Option<DateTime<Utc>> {
    let secs = lifetime_secs.checked_sub(REFRESH_MARGIN_SECS)?;
    now.checked_add_signed(TimeDelta::try_seconds(secs)?)
}

/// Holds the current access token and the optional refresh credentials.
///
/// Token and expiry live behind one lock and are only ever replaced together,
/// so readers always see a matching pair. `Debug` output never includes secrets.
#[derive(Debug)]
pub struct CredentialStore {
    current: RwLock<AccessToken>,
    refresh: Option<RefreshCredentials>,
}

impl CredentialStore {
    pub fn new(token: AccessToken, refresh: Option<RefreshCredentials>) -> Self {
        Self {
            current: RwLock::new(token),
            refresh,
        }
    }

    /// Create a store from startup configuration.
    ///
    /// A supplied token is assumed valid for `lifetime_secs` from now (minus the margin).
    /// Without one, or with an unrepresentable lifetime, the store starts stale so the
    /// first dispatch refreshes before any call.
    pub fn from_startup(
        access_token: impl Into<String>,
        lifetime_secs: i64,
        refresh: Option<RefreshCredentials>,
    ) -> Self {
        let value = access_token.into();
        let expires_at = if value.is_empty() {
            DateTime::<Utc>::MIN_UTC
        } else {
            expiry_with_margin(Utc::now(), lifetime_secs).unwrap_or(DateTime::<Utc>::MIN_UTC)
        };
        Self::new(AccessToken { value, expires_at }, refresh)
    }

    /// Consistent copy of the token and its expiry.
    pub fn snapshot(&self) -> AccessToken {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.snapshot().is_stale(now)
    }

    /// Replace token and expiry in a single write.
    pub fn replace(&self, value: impl Into<String>, expires_at: DateTime<Utc>) {
        let token = AccessToken {
            value: value.into(),
            expires_at,
        };
        match self.current.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn refresh_credentials(&self) -> Option<&RefreshCredentials> {
        self.refresh.as_ref()
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh.is_some()
    }
}
