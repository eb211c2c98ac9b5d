//! Wrapper error types.

use thiserror::Error;

/// Result type alias for wrapper operations.
pub type Result<T> = std::result::Result<T, WrapperError>;

/// Everything that can make an invocation fail.
#[derive(Debug, Error)]
pub enum WrapperError {
    /// Unknown resource or operation, or badly shaped parameters.
    #[error("{0}")]
    Validation(String),

    /// `--parameters` is not valid JSON.
    #[error("invalid parameters JSON: {0}")]
    InvalidParameters(#[source] serde_json::Error),

    /// The client could not be built from the connection settings.
    #[error("invalid connection settings: {0}")]
    Config(#[source] conductor_client::Error),

    /// The SDK call failed; its message is reported unchanged.
    #[error(transparent)]
    Sdk(#[from] conductor_client::Error),
}

impl WrapperError {
    /// Whether the error was raised before any SDK call was made.
    pub fn is_local(&self) -> bool {
        !matches!(self, WrapperError::Sdk(_))
    }
}
