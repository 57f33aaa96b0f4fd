use reqwest::Url;

use super::ClientError;

/// Path segment Zoho uses for inline images when rendered in the browser.
const BROWSER_VIEW_SEGMENT: &str = "/viewInlineImage";

/// Equivalent segment served by the API host, which accepts OAuth tokens.
const API_VIEW_SEGMENT: &str = "/api/v3/viewInlineImage";

/// Turn a URL found in Zoho content into one the API host will serve with a bearer token.
///
/// Relative paths are joined to `api_domain`; the browser inline-image segment is
/// swapped for its API counterpart. Only `http` and `https` URLs are accepted.
pub fn resolve_download_url(url: &str, api_domain: &str) -> Result<Url, ClientError> {
    let url = url.trim();
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let mut resolved = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => {
            let joined = format!(
                "{}/{}",
                api_domain.trim_end_matches('/'),
                url.trim_start_matches('/')
            );
            Url::parse(&joined).map_err(|e| invalid(e.to_string()))?
        }
    };

    if !matches!(resolved.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", resolved.scheme())));
    }

    let path = resolved.path().to_string();
    if !path.contains(API_VIEW_SEGMENT) && path.contains(BROWSER_VIEW_SEGMENT) {
        resolved.set_path(&path.replacen(BROWSER_VIEW_SEGMENT, API_VIEW_SEGMENT, 1));
    }

    Ok(resolved)
}

/// ASCII origin (`scheme://host[:port]`) of `domain`, if it parses as a URL.
pub(crate) fn origin_of(domain: &str) -> Option<String> {
    Url::parse(domain.trim())
        .ok()
        .map(|url| url.origin().ascii_serialization())
}
