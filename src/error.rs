//! Error types for the CDP client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use cdp_client::{Result, Connection};
//! use serde_json::json;
//!
//! async fn example(connection: &Connection) -> Result<()> {
//!     connection.send("Page.enable", json!({})).await?;
//!     connection.send("Page.navigate", json!({"url": "https://example.com"})).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`], [`Error::NotConnected`] |
//! | Protocol | [`Error::Cdp`], [`Error::Protocol`] |
//! | Discovery | [`Error::Discovery`], [`Error::NoSuchTarget`] |
//! | Execution | [`Error::RequestTimeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Http`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::CommandId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when the WebSocket handshake with the browser fails.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection timeout.
    ///
    /// Returned when the browser endpoint does not answer within the
    /// timeout period.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed unexpectedly.
    ///
    /// Every command that was still in flight when the connection dropped
    /// resolves with this error.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Command issued without a live connection.
    ///
    /// Returned by `send` after `close()` or after the browser went away.
    /// Commands are never queued; callers must reconnect.
    #[error("Not connected")]
    NotConnected,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// The browser answered a command with an error object.
    ///
    /// Carries the structured `{code, message}` pair from the response,
    /// e.g. `-32601 "'Page.navigat' wasn't found"`.
    #[error("CDP error {code}: {message}")]
    Cdp {
        /// Protocol error code.
        code: i64,
        /// Protocol error message.
        message: String,
    },

    /// Local protocol violation.
    ///
    /// Returned when the client itself refuses a command, e.g. too many
    /// pending requests.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Discovery Errors
    // ========================================================================
    /// Discovery endpoint returned an unusable answer.
    ///
    /// Returned when a `/json/*` endpoint responds with an unexpected
    /// status or payload.
    #[error("Discovery error: {message}")]
    Discovery {
        /// Description of the discovery failure.
        message: String,
    },

    /// No debuggable target of the requested kind.
    ///
    /// Returned when `/json/list` contains no matching target.
    #[error("No {kind} target available")]
    NoSuchTarget {
        /// Target kind that was requested (e.g. `page`).
        kind: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Command request timeout.
    ///
    /// Returned when no response arrived within the per-command timeout.
    /// The pending entry is removed; a late response is dropped.
    #[error("Command {command_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The command ID that timed out.
        command_id: CommandId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// HTTP error from the discovery endpoints.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a CDP error from a response error object.
    #[inline]
    pub fn cdp(code: i64, message: impl Into<String>) -> Self {
        Self::Cdp {
            code,
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a discovery error.
    #[inline]
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    /// Creates a no-such-target error.
    #[inline]
    pub fn no_such_target(kind: impl Into<String>) -> Self {
        Self::NoSuchTarget { kind: kind.into() }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(command_id: CommandId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            command_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::NotConnected
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the browser rejected the command itself.
    #[inline]
    #[must_use]
    pub fn is_cdp_error(&self) -> bool {
        matches!(self, Self::Cdp { .. })
    }

    /// Returns the CDP error code, if any.
    #[inline]
    #[must_use]
    pub fn cdp_code(&self) -> Option<i64> {
        match self {
            Self::Cdp { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_cdp_error_display() {
        let err = Error::cdp(-32000, "boom");
        assert_eq!(err.to_string(), "CDP error -32000: boom");
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::ConnectionTimeout { timeout_ms: 5000 };
        let other_err = Error::connection("test");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        let conn_err = Error::connection("test");
        let timeout_err = Error::ConnectionTimeout { timeout_ms: 1000 };
        let closed_err = Error::ConnectionClosed;
        let not_connected = Error::NotConnected;
        let other_err = Error::discovery("test");

        assert!(conn_err.is_connection_error());
        assert!(timeout_err.is_connection_error());
        assert!(closed_err.is_connection_error());
        assert!(not_connected.is_connection_error());
        assert!(!other_err.is_connection_error());
    }

    #[test]
    fn test_cdp_code() {
        let cdp_err = Error::cdp(-32601, "method not found");
        let other_err = Error::ConnectionClosed;

        assert!(cdp_err.is_cdp_error());
        assert_eq!(cdp_err.cdp_code(), Some(-32601));
        assert_eq!(other_err.cdp_code(), None);
    }

    #[test]
    fn test_is_recoverable() {
        let timeout_err = Error::request_timeout(CommandId::new(7), 1000);
        let cdp_err = Error::cdp(-32000, "boom");

        assert!(timeout_err.is_recoverable());
        assert!(!cdp_err.is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
