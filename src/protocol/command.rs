//! Outbound command request type.
//!
//! Defines the message format for commands sent from the client to the
//! browser.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::identifiers::CommandId;

// ============================================================================
// CommandRequest
// ============================================================================

/// A command request from the client to the browser.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "method": "Domain.methodName",
///   "params": { ... }
/// }
/// ```
///
/// The `params` object is always present; commands without parameters send
/// an empty object, which every CDP domain accepts.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest {
    /// Correlation identifier, unique per connection.
    pub id: CommandId,

    /// Method in `Domain.methodName` format.
    pub method: String,

    /// Method parameters.
    pub params: Value,
}

impl CommandRequest {
    /// Creates a new request.
    ///
    /// A `null` params value is normalized to an empty object.
    #[must_use]
    pub fn new(id: CommandId, method: impl Into<String>, params: Value) -> Self {
        let params = match params {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };

        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
