//! Credential lifecycle: the token store and the OAuth refresh exchange.

mod credential;
mod refresher;

pub use credential::{
    expiry_with_margin, redact, AccessToken, CredentialStore, RefreshCredentials,
    REFRESH_MARGIN_SECS,
};
pub use refresher::{RefreshError, TokenRefresher};
