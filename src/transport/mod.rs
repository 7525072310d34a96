//! WebSocket transport layer.
//!
//! This module handles communication between the client (local end) and
//! the browser (remote end) via the DevTools WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  Browser        │
//! │                 │         WebSocket            │  (DevTools)     │
//! │  Connection     │◄────────────────────────────►│                 │
//! │  + dispatch     │   ws://host:port/devtools/…  │                 │
//! │    loop         │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. Discovery resolves a `webSocketDebuggerUrl` (see [`crate::discovery`])
//! 2. `Connection::connect` dials the URL and spawns the dispatch loop
//! 3. `Connection::send` issues commands, `on`/`once` subscribe to events
//! 4. `Connection::close` (or dropping every handle) stops the loop and
//!    fails all still-pending commands
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and dispatch loop |
//! | `correlation` | Pending-command table keyed by command ID |
//! | `events` | Event subscriber registry and fan-out |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and dispatch loop.
pub mod connection;

/// Pending-command correlation table.
pub mod correlation;

/// Event subscriber registry.
pub mod events;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use correlation::CorrelationTable;
pub use events::{EventBus, EventCallback};
