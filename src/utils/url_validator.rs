//! URL 验证模块
//!
//! Only absolute http(s) URLs are accepted as redirect targets.

use url::Url;

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => write!(f, "Dangerous protocol blocked: {}", proto),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 危险协议列表
const DANGEROUS_SCHEMES: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

/// Validates a redirect target and returns the parsed URL.
///
/// Scheme checks run on the raw prefix first so that `javascript:` and friends
/// are reported as dangerous even when they would not parse as URLs.
pub fn validate_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }
    // the parser drops embedded tabs and newlines instead of rejecting them
    if raw.chars().any(char::is_control) {
        return Err(UrlValidationError::InvalidFormat(
            "control characters are not allowed".to_string(),
        ));
    }

    let scheme = raw
        .split_once(':')
        .map(|(s, _)| s.to_ascii_lowercase())
        .unwrap_or_default();

    if DANGEROUS_SCHEMES.contains(&scheme.as_str()) {
        return Err(UrlValidationError::DangerousProtocol(format!("{}:", scheme)));
    }
    if scheme != "http" && scheme != "https" {
        return Err(UrlValidationError::InvalidProtocol(format!("{}:", scheme)));
    }

    let parsed = Url::parse(raw).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat("missing host".to_string()));
    }

    Ok(parsed)
}

/// Validates `raw` and returns the string to store and send as `Location`.
///
/// Input made only of visible ASCII is kept as typed. Anything else (non-ASCII
/// hosts or paths, inner spaces) is replaced by the parser's serialization,
/// which is percent-encoded ASCII.
pub fn normalize_url(raw: &str) -> Result<String, UrlValidationError> {
    let parsed = validate_url(raw)?;
    let raw = raw.trim();
    if raw.bytes().all(|b| b.is_ascii_graphic()) {
        Ok(raw.to_string())
    } else {
        Ok(parsed.into())
    }
}
