//! Command response types.
//!
//! Defines the message format for command responses from the browser,
//! including the structured protocol error object.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CommandId;

// ============================================================================
// CommandResponse
// ============================================================================

/// A response from the browser to one command.
///
/// # Format
///
/// Success:
/// ```json
/// {
///   "id": 1,
///   "result": { ... }
/// }
/// ```
///
/// Error:
/// ```json
/// {
///   "id": 1,
///   "error": { "code": -32000, "message": "..." }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CommandResponse {
    /// Matches the command `id`.
    pub id: CommandId,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Structured error (if the browser rejected the command).
    #[serde(default)]
    pub error: Option<CdpError>,
}

impl CommandResponse {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, converting an error object into
    /// [`Error::Cdp`].
    ///
    /// A success response without a `result` field yields an empty object,
    /// which is what the browser means by it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cdp`] if the response carried an error object.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(error) => Err(Error::cdp(error.code, error.message)),
            None => Ok(self
                .result
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()))),
        }
    }
}

// ============================================================================
// CdpError
// ============================================================================

/// Structured error object from a command response.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpError {
    /// Protocol error code (JSON-RPC style, e.g. `-32601`).
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional detail string some domains attach.
    #[serde(default)]
    pub data: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let json_str = r#"{
            "id": 5,
            "result": {"frameId": "F1"}
        }"#;

        let response: CommandResponse = serde_json::from_str(json_str).expect("parse");
        assert!(!response.is_error());
        assert_eq!(response.id, CommandId::new(5));

        let result = response.into_result().expect("should succeed");
        assert_eq!(result["frameId"], "F1");
    }

    #[test]
    fn test_error_response() {
        let json_str = r#"{
            "id": 5,
            "error": {"code": -32000, "message": "boom"}
        }"#;

        let response: CommandResponse = serde_json::from_str(json_str).expect("parse");
        assert!(response.is_error());

        let err = response.into_result().expect_err("should fail");
        match err {
            Error::Cdp { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_with_data() {
        let json_str = r#"{
            "id": 9,
            "error": {"code": -32602, "message": "Invalid parameters", "data": "url: string value expected"}
        }"#;

        let response: CommandResponse = serde_json::from_str(json_str).expect("parse");
        let error = response.error.as_ref().expect("error object");
        assert_eq!(error.data.as_deref(), Some("url: string value expected"));
    }

    #[test]
    fn test_success_without_result_field() {
        let response: CommandResponse = serde_json::from_str(r#"{"id": 2}"#).expect("parse");
        let result = response.into_result().expect("should succeed");
        assert!(result.as_object().is_some_and(|map| map.is_empty()));
    }
}
