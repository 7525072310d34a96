//! WebSocket connection and dispatch loop.
//!
//! This module handles the WebSocket connection to the browser's DevTools
//! endpoint, including command/response correlation and event routing.
//!
//! # Dispatch Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming frames from the browser (responses, events)
//! - Outgoing commands from the Rust API
//! - Command/response correlation by integer ID
//! - Event subscriber fan-out
//!
//! The loop is the only reader of the socket and the only writer to it;
//! callers reach it through an unbounded command channel and wait on
//! oneshot slots registered in the correlation table.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_with_config};
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::SubscriptionId;
use crate::protocol::{CommandRequest, Event, InboundMessage};

use super::correlation::CorrelationTable;
use super::events::EventBus;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending commands before rejecting new ones.
const MAX_PENDING_COMMANDS: usize = 256;

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream type after the handshake.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the split stream, owned by the dispatch loop.
type WsSink = SplitSink<WsStream, Message>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the dispatch loop.
enum ConnectionCommand {
    /// Serialize and write one request. The caller's slot is already
    /// registered in the correlation table.
    Send {
        request: CommandRequest,
    },
    /// Close the socket and stop the loop.
    Close,
}

// ============================================================================
// Connection
// ============================================================================

/// Connection to one DevTools target.
///
/// Handles command/response correlation and event routing. The connection
/// spawns an internal dispatch loop task on [`Connection::connect`].
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync`, cheap to clone, and safe to use from
/// many tasks concurrently. Dropping the last handle closes the
/// connection: the command channel closes, the loop exits, and every
/// pending command fails with [`Error::ConnectionClosed`].
pub struct Connection {
    /// The URL this connection was dialed with.
    url: String,
    /// Channel into the dispatch loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Pending-command table (shared with the loop).
    table: Arc<CorrelationTable>,
    /// Event subscribers (shared with the loop).
    events: Arc<EventBus>,
    /// Live-connection flag, cleared when the loop exits.
    connected: Arc<AtomicBool>,
    /// Loop-exit signal.
    closed_rx: watch::Receiver<bool>,
}

impl Clone for Connection {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            command_tx: self.command_tx.clone(),
            table: Arc::clone(&self.table),
            events: Arc::clone(&self.events),
            connected: Arc::clone(&self.connected),
            closed_rx: self.closed_rx.clone(),
        }
    }
}

impl Connection {
    /// Dials a DevTools WebSocket URL and spawns the dispatch loop.
    ///
    /// Message-size and frame-size limits are disabled: CDP responses can
    /// carry full-page screenshots and DOM snapshots that blow past the
    /// default caps.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the handshake takes too long
    /// - [`Error::Connection`] if the handshake fails
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let config = WebSocketConfig::default()
            .max_message_size(None)
            .max_frame_size(None);

        let handshake = connect_async_with_config(ws_url, Some(config), true);
        let (ws_stream, _response) = timeout(CONNECT_TIMEOUT, handshake)
            .await
            .map_err(|_| Error::connection_timeout(CONNECT_TIMEOUT.as_millis() as u64))?
            .map_err(|e| Error::connection(format!("WebSocket handshake failed: {e}")))?;

        info!(url = ws_url, "DevTools connection established");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = watch::channel(false);
        let table = Arc::new(CorrelationTable::new());
        let events = Arc::new(EventBus::new());
        let connected = Arc::new(AtomicBool::new(true));

        tokio::spawn(Self::run_dispatch_loop(
            ws_stream,
            command_rx,
            Arc::clone(&table),
            Arc::clone(&events),
            Arc::clone(&connected),
            closed_tx,
        ));

        Ok(Self {
            url: ws_url.to_string(),
            command_tx,
            table,
            events,
            connected,
            closed_rx,
        })
    }

    /// Returns the URL this connection was dialed with.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `true` while the dispatch loop is running.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Returns the number of pending commands.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.table.len()
    }

    /// Sends a command and waits for its response with the default
    /// timeout (30s).
    ///
    /// The result is the raw `result` mapping of the response; typed
    /// decoding is the per-domain layer's job.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the connection is not live
    /// - [`Error::Cdp`] if the browser rejected the command
    /// - [`Error::ConnectionClosed`] if the connection dropped mid-flight
    /// - [`Error::RequestTimeout`] if no response arrived in time
    pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
        self.send_with_timeout(method, params, DEFAULT_COMMAND_TIMEOUT)
            .await
    }

    /// Sends a command and waits for its response with a custom timeout.
    ///
    /// On timeout the pending entry is removed, so a late response for
    /// this command is dropped as unknown rather than resolving anything.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::send`], plus [`Error::Protocol`] when the
    /// in-flight command cap is reached.
    pub async fn send_with_timeout(
        &self,
        method: &str,
        params: Value,
        command_timeout: Duration,
    ) -> Result<Value> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let pending = self.table.len();
        if pending >= MAX_PENDING_COMMANDS {
            warn!(
                pending,
                max = MAX_PENDING_COMMANDS,
                "Too many pending commands"
            );
            return Err(Error::protocol(format!(
                "Too many pending commands: {pending}/{MAX_PENDING_COMMANDS}"
            )));
        }

        let (id, slot) = self.table.allocate(method);
        let request = CommandRequest::new(id, method, params);

        if self
            .command_tx
            .send(ConnectionCommand::Send { request })
            .is_err()
        {
            self.table.remove(id);
            return Err(Error::NotConnected);
        }

        match timeout(command_timeout, slot).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                self.table.remove(id);
                Err(Error::request_timeout(
                    id,
                    command_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Registers a persistent event subscription.
    ///
    /// Callbacks run on the dispatch loop in frame-arrival order; they
    /// must not block on network round trips of their own, or the loop
    /// stalls.
    pub fn on<F>(&self, event: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.on(event, callback)
    }

    /// Registers an event subscription removed after its first delivery.
    pub fn once<F>(&self, event: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.once(event, callback)
    }

    /// Removes an event subscription.
    ///
    /// Returns `false` if the subscription was not found.
    pub fn off(&self, event: &str, id: SubscriptionId) -> bool {
        self.events.off(event, id)
    }

    /// Closes the connection.
    ///
    /// Idempotent. The dispatch loop closes the socket, stops, and fails
    /// every still-pending command with [`Error::ConnectionClosed`]. Use
    /// [`Connection::closed`] to wait for that to finish.
    pub fn close(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Close);
    }

    /// Resolves once the dispatch loop has stopped, for any reason.
    pub async fn closed(&self) {
        let mut closed_rx = self.closed_rx.clone();
        let _ = closed_rx.wait_for(|closed| *closed).await;
    }
}

// ============================================================================
// Connection - Dispatch Loop
// ============================================================================

impl Connection {
    /// Dispatch loop that owns the WebSocket.
    async fn run_dispatch_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        table: Arc<CorrelationTable>,
        events: Arc<EventBus>,
        connected: Arc<AtomicBool>,
        closed_tx: watch::Sender<bool>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from the browser
                frame = ws_read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_frame(text.as_str(), &table, &events);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request }) => {
                            Self::handle_send_command(request, &mut ws_write, &table).await;
                        }

                        Some(ConnectionCommand::Close) => {
                            debug!("Close command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        // No caller may hang once the connection is gone.
        connected.store(false, Ordering::SeqCst);
        let drained = table.drain_all();
        if drained > 0 {
            debug!(count = drained, "Drained pending commands on close");
        }
        let _ = closed_tx.send(true);

        debug!("Dispatch loop terminated");
    }

    /// Handles one incoming text frame.
    ///
    /// Decode failures are logged and skipped; a malformed frame must not
    /// take down the loop.
    fn handle_frame(text: &str, table: &CorrelationTable, events: &EventBus) {
        let message: InboundMessage = match from_str(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable frame");
                return;
            }
        };

        match message {
            InboundMessage::Response(response) => {
                let id = response.id;
                let delivered = match response.error {
                    Some(err) => table.fail(id, Error::cdp(err.code, err.message)),
                    None => table.fulfill(
                        id,
                        response
                            .result
                            .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
                    ),
                };

                // Already answered, timed out, or cancelled.
                if !delivered {
                    trace!(id = %id, "Response for unknown command dropped");
                }
            }

            InboundMessage::Event(event) => {
                trace!(method = %event.method, "Event received");
                events.emit(&event);
            }
        }
    }

    /// Serializes and writes one request.
    async fn handle_send_command(
        request: CommandRequest,
        ws_write: &mut WsSink,
        table: &CorrelationTable,
    ) {
        let id = request.id;

        let json = match to_string(&request) {
            Ok(json) => json,
            Err(e) => {
                let _ = table.fail(id, Error::Json(e));
                return;
            }
        };

        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            let _ = table.fail(id, Error::connection(e.to_string()));
            return;
        }

        trace!(id = %id, "Command sent");
    }
}

// ============================================================================
// Tests
// ============================================================================
