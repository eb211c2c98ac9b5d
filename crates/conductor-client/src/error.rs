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

    /// Server returned an error response. Displays the server's message as-is.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Authentication failed.
    #[error("{0}")]
    Auth(String),

    /// Resource not found.
    #[error("{0}")]
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
        matches!(self, Error::Auth(_))
            || matches!(self, Error::Api { status: 401, .. })
            || matches!(self, Error::Api { status: 403, .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the Conductor server.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Pick the message to report for a failed response body.
    pub(crate) fn message_from_body(status: u16, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
            if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
                return message;
            }
        }

        let body = body.trim();
        if body.is_empty() || body.starts_with('{') {
            format!("HTTP {}", status)
        } else {
            body.to_string()
        }
    }
}
