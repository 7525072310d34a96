//! CDP Client - Chrome DevTools Protocol client library.
//!
//! This library speaks the Chrome DevTools Protocol over one persistent
//! WebSocket per target: commands go out with correlation IDs, responses
//! come back matched to their callers, and unsolicited events fan out to
//! subscribers.
//!
//! # Architecture
//!
//! The client follows a client-server model:
//!
//! - **Local End (Rust)**: sends commands, receives responses and events
//! - **Remote End (Browser)**: executes commands, pushes events
//!
//! Key design principles:
//!
//! - One [`Connection`] owns: WebSocket + correlation table + dispatch loop
//! - Protocol uses `Domain.methodName` format with integer correlation ids
//! - The dispatch loop is the sole reader and writer of the socket
//! - Pending commands never hang: connection loss fails every one of them
//!
//! # Quick Start
//!
//! ```no_run
//! use cdp_client::{Connection, DiscoveryClient, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Find a debuggable page on a running browser
//!     let discovery = DiscoveryClient::new("http://127.0.0.1:9222")?;
//!     let target = discovery.first_page().await?;
//!
//!     // Connect and drive it
//!     let connection = Connection::connect(target.ws_url()?).await?;
//!     connection.on("Page.loadEventFired", |event| {
//!         println!("loaded: {:?}", event.params);
//!     });
//!
//!     connection.send("Page.enable", json!({})).await?;
//!     connection
//!         .send("Page.navigate", json!({"url": "https://example.com"}))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`discovery`] | HTTP bootstrap: `/json/list`, `/json/new`, ... |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire message types (internal) |
//! | [`transport`] | WebSocket transport and dispatch loop (internal) |
//!
//! # Scope
//!
//! This crate is the transport core only. Typed wrappers for the hundreds
//! of generated domain methods sit above it and reduce to
//! `connection.send("Domain.method", params)` plus `on`/`once`/`off`.

// ============================================================================
// Modules
// ============================================================================

/// HTTP discovery of debuggable targets.
///
/// Resolves a `webSocketDebuggerUrl` before [`Connection::connect`] runs.
pub mod discovery;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for protocol entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Wire message types.
///
/// Internal module defining command/response/event structures.
pub mod protocol;

/// WebSocket transport layer.
///
/// Internal module handling the connection and its dispatch loop.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Discovery types
pub use discovery::{DiscoveryClient, TargetInfo, VersionInfo};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CommandId, SubscriptionId, TargetId};

// Protocol types
pub use protocol::{Event, ParsedEvent};

// Transport types
pub use transport::Connection;
