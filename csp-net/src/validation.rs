// csp-net/src/validation.rs
use csp_common::error::{CspError, Result};
use url::Url;

/// Validates a download URL. TPP servers on private networks are commonly
/// reached over plain http, so both http and https are accepted.
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str)
        .map_err(|e| CspError::ValidationError(format!("Failed to parse URL '{url_str}': {e}")))?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        other => Err(CspError::ValidationError(format!(
            "Invalid URL scheme for '{url_str}': Must be http or https, but got '{other}'"
        ))),
    }
}
