//! The JSON envelope printed for every invocation.

use serde::Serialize;
use serde_json::Value;

use crate::error::WrapperError;

/// Status code reported on success.
pub const STATUS_OK: u16 = 200;

/// Status code reported for every failure.
pub const STATUS_ERROR: u16 = 500;

/// Uniform response envelope, serialized as one JSON line on stdout.
///
/// `content` is a legacy duplicate of `data` rendered as a JSON string, kept
/// for consumers that parse it instead of `data`. Both always describe the
/// same value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkResponse {
    pub status_code: u16,
    pub success: bool,
    pub data: Value,
    pub content: String,
    pub error_message: String,
}

impl SdkResponse {
    /// Successful response carrying the raw SDK result.
    pub fn success(data: Value) -> Self {
        let content = if data.is_null() {
            String::new()
        } else {
            data.to_string()
        };

        Self {
            status_code: STATUS_OK,
            success: true,
            data,
            content,
            error_message: String::new(),
        }
    }

    /// Failed response. Status codes below 400 are raised to 500.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: if status_code >= 400 {
                status_code
            } else {
                STATUS_ERROR
            },
            success: false,
            data: Value::Null,
            content: String::new(),
            error_message: message.into(),
        }
    }

    /// Failed response for a wrapper error.
    pub fn failure(err: &WrapperError) -> Self {
        Self::error(STATUS_ERROR, err.to_string())
    }

    /// Envelope for the outcome of a dispatched operation.
    pub fn from_result(result: Result<Value, WrapperError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(&err),
        }
    }

    /// Render as a single JSON line.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"statusCode":{},"success":false,"data":null,"content":"","errorMessage":{}}}"#,
                STATUS_ERROR,
                Value::String(format!("failed to serialize response: {e}"))
            )
        })
    }
}
