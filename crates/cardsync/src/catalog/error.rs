//! Error types for catalog API operations.

use thiserror::Error;

/// Errors that can occur when fetching from the remote catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body was not a valid page.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FetchError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Check if an error is worth retrying: rate limiting or a server-side failure.
pub fn is_transient(err: &FetchError) -> bool {
    matches!(err, FetchError::Api { status, .. } if *status == 429 || *status >= 500)
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &FetchError) -> String {
    match err {
        FetchError::Http(_) => "Network error".to_string(),
        FetchError::Json(_) => "JSON parse error".to_string(),
        FetchError::Api { status, message } => {
            let message = message.trim();
            if message.is_empty() {
                format!("HTTP {}", status)
            } else if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        FetchError::Config(msg) => format!("Config: {}", msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> FetchError {
        FetchError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_is_transient() {
        assert!(is_transient(&api(429, "slow down")));
        assert!(is_transient(&api(500, "")));
        assert!(is_transient(&api(503, "busy")));
        assert!(!is_transient(&api(404, "missing")));
        assert!(!is_transient(&api(401, "unauthorized")));
        assert!(!is_transient(&FetchError::Http("connection reset".to_string())));
        assert!(!is_transient(&FetchError::Config("bad url".to_string())));
    }

    #[test]
    fn test_status() {
        assert_eq!(api(503, "").status(), Some(503));
        assert_eq!(FetchError::Http("x".to_string()).status(), None);
    }

    #[test]
    fn test_short_error_message_api() {
        assert_eq!(short_error_message(&api(404, "Not Found")), "HTTP 404: Not Found");
        assert_eq!(short_error_message(&api(502, "  ")), "HTTP 502");
    }

    #[test]
    fn test_short_error_message_truncates_multibyte() {
        let long = "é".repeat(80);
        let msg = short_error_message(&api(500, &long));
        assert!(msg.starts_with("HTTP 500: "));
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().filter(|c| *c == 'é').count(), 47);
    }

    #[test]
    fn test_short_error_message_other_variants() {
        assert_eq!(
            short_error_message(&FetchError::Http("reset".to_string())),
            "Network error"
        );
        let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(short_error_message(&FetchError::Json(json_err)), "JSON parse error");
        assert_eq!(
            short_error_message(&FetchError::Config("missing base_url".to_string())),
            "Config: missing base_url"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(api(503, "busy").to_string(), "API error (503): busy");
    }
}
