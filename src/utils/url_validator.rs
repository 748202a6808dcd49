//! Destination URL validation
//!
//! Only absolute http(s) URLs with a host are accepted as redirect targets.

use url::Url;

use crate::errors::{Result, SnaplinkError};

/// Longest destination accepted, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Schemes that must never end up in a `Location` header.
const DANGEROUS_SCHEMES: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

/// Validate `raw` as a redirect destination and return it trimmed.
pub fn validate_original_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(SnaplinkError::validation("originalUrl cannot be empty"));
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(SnaplinkError::validation(format!(
            "originalUrl exceeds {} bytes",
            MAX_URL_LENGTH
        )));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(SnaplinkError::validation(
            "originalUrl must not contain whitespace",
        ));
    }
    // Url::parse lets these through, but they cannot go into a Location header.
    if trimmed.chars().any(char::is_control) {
        return Err(SnaplinkError::validation(
            "originalUrl must not contain control characters",
        ));
    }

    let parsed = Url::parse(trimmed).map_err(|e| {
        SnaplinkError::validation(format!("originalUrl is not an absolute URL: {}", e))
    })?;

    let scheme = parsed.scheme();
    if DANGEROUS_SCHEMES.contains(&scheme) {
        return Err(SnaplinkError::validation(format!(
            "Scheme '{}' is not allowed",
            scheme
        )));
    }
    if scheme != "http" && scheme != "https" {
        return Err(SnaplinkError::validation(
            "originalUrl must start with http:// or https://",
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(SnaplinkError::validation("originalUrl must include a host"));
    }

    Ok(trimmed.to_string())
}
