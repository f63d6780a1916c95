//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code (or type) reported by the service.
        code: String,
        /// Error message reported by the service.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_)) || matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error envelope returned by the service: `{"error": {...}}`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Most specific identifier available: `code`, then `type`.
    pub(crate) fn code(&self) -> String {
        self.code
            .clone()
            .or_else(|| self.kind.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err = Error::Api {
            status: 429,
            code: "rate_limit_exceeded".to_string(),
            message: "slow down".to_string(),
        };
        assert!(err.is_rate_limited());
        assert!(!err.is_server_error());

        let err = Error::Api {
            status: 503,
            code: "unknown".to_string(),
            message: "HTTP 503".to_string(),
        };
        assert!(err.is_server_error());

        assert!(Error::NotFound("thread".to_string()).is_not_found());
        assert!(Error::Auth("bad key".to_string()).is_auth_error());
    }

    #[test]
    fn test_error_body_code_fallback() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"error": {"message": "No thread found", "type": "invalid_request_error", "code": null}}"#,
        )
        .unwrap();
        assert_eq!(body.error.code(), "invalid_request_error");
        assert_eq!(body.error.message, "No thread found");
    }
}
