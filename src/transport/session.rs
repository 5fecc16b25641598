//! WebSocket session and event loop.
//!
//! This module handles the WebSocket connection to the debugging
//! endpoint, including request/response correlation and event routing.
//!
//! # Event Loop
//!
//! The session spawns a tokio task that handles:
//!
//! - Inbound frames from the endpoint (responses, events)
//! - Outbound calls from the Rust API
//! - Request/response correlation by numeric id
//! - Dispatch of context-created events to a registered watcher
//!
//! Responses may arrive out of order; correctness depends solely on id
//! correlation. Timeouts are per-request — a slow call never blocks
//! unrelated calls on the same connection. When the socket closes or
//! errors, every pending call is failed with a connection-closed error
//! rather than left to ride out its individual timeout.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{EXECUTION_CONTEXT_CREATED, Event, InboundFrame, MethodCall};

// ============================================================================
// Constants
// ============================================================================

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = futures_util::stream::SplitSink<WsStream, Message>;

/// One outstanding request awaiting its correlated response.
struct PendingEntry {
    /// Method name, kept for timeout diagnostics.
    method: String,
    /// When the request was sent.
    created_at: Instant,
    /// Resolves the caller's await. Exactly one resolver per id.
    tx: oneshot::Sender<Result<Value>>,
}

/// Map of request ids to their pending entries.
type PendingMap = FxHashMap<RequestId, PendingEntry>;

/// Registered watcher for context-created events.
type ContextWatcher = Option<mpsc::UnboundedSender<Value>>;

// ============================================================================
// TransportCommand
// ============================================================================

/// Internal commands for the event loop.
enum TransportCommand {
    /// Send a call and register its pending entry.
    Send {
        call: MethodCall,
        tx: oneshot::Sender<Result<Value>>,
    },
    /// Remove a timed-out pending entry.
    RemovePending(RequestId),
    /// Close the socket and terminate the loop.
    Close,
}

// ============================================================================
// SessionTransport
// ============================================================================

/// WebSocket client session against the debugging endpoint.
///
/// Handles request/response correlation and event routing. The session
/// spawns an internal event loop task on connect.
///
/// # Thread Safety
///
/// `SessionTransport` is `Send + Sync` and can be shared across tasks;
/// the id counter and pending table are guarded so the "exactly one
/// resolver per id" invariant holds under concurrent `send` calls.
pub struct SessionTransport {
    /// Channel feeding the event loop.
    command_tx: mpsc::UnboundedSender<TransportCommand>,
    /// Pending table (shared with the event loop).
    pending: Arc<Mutex<PendingMap>>,
    /// Context-created watcher slot (shared with the event loop).
    context_watcher: Arc<Mutex<ContextWatcher>>,
    /// Cleared when the event loop terminates.
    connected: Arc<AtomicBool>,
    /// Per-request timeout for `send`.
    request_timeout: Duration,
}

impl SessionTransport {
    /// Opens a WebSocket connection to `url`.
    ///
    /// Resolves once the open handshake completes; a handshake failure
    /// rejects this call specifically, never a later request.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the handshake fails or times out
    pub async fn connect(url: &str, request_timeout: Duration) -> Result<Self> {
        debug!(%url, "Connecting WebSocket session");

        let ws_stream = match timeout(request_timeout, connect_async(url)).await {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => return Err(Error::connection(e.to_string())),
            Err(_) => {
                return Err(Error::connection(format!(
                    "handshake timed out after {}ms",
                    request_timeout.as_millis()
                )));
            }
        };

        Ok(Self::from_stream(ws_stream, request_timeout))
    }

    /// Wraps an already-open WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn from_stream(ws_stream: WsStream, request_timeout: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(PendingMap::default()));
        let context_watcher: Arc<Mutex<ContextWatcher>> = Arc::new(Mutex::new(None));
        let connected = Arc::new(AtomicBool::new(true));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&pending),
            Arc::clone(&context_watcher),
            Arc::clone(&connected),
        ));

        Self {
            command_tx,
            pending,
            context_watcher,
            connected,
            request_timeout,
        }
    }

    /// Sends a method call and awaits its correlated response.
    ///
    /// Uses the session's per-request timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the session is down
    /// - [`Error::RequestTimeout`] naming the id and method on deadline
    /// - [`Error::Protocol`] if the remote end reports an error
    pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
        self.send_with_timeout(method, params, self.request_timeout)
            .await
    }

    /// Sends a method call with an explicit timeout.
    ///
    /// On timeout the pending entry is removed; a late-arriving response
    /// for that id is silently dropped.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn send_with_timeout(
        &self,
        method: &str,
        params: Value,
        request_timeout: Duration,
    ) -> Result<Value> {
        if !self.is_connected() {
            return Err(Error::ConnectionClosed);
        }

        let call = MethodCall::new(method, params);
        let request_id = call.id;

        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(TransportCommand::Send { call, tx })
            .map_err(|_| Error::ConnectionClosed)?;

        match timeout(request_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                // Deadline hit: drop the entry so a late response is
                // ignored instead of resolving a dead waiter.
                let _ = self
                    .command_tx
                    .send(TransportCommand::RemovePending(request_id));

                Err(Error::request_timeout(
                    request_id,
                    method,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Registers a watcher for context-created events.
    ///
    /// Replaces any previous watcher. Events arriving with no watcher
    /// registered are ignored.
    pub fn watch_context_created(&self) -> mpsc::UnboundedReceiver<Value> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.context_watcher.lock() = Some(tx);
        rx
    }

    /// Clears the context-created watcher.
    pub fn clear_context_watcher(&self) {
        *self.context_watcher.lock() = None;
    }

    /// Returns `true` while the event loop is alive.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns the session's per-request timeout.
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Closes the socket.
    ///
    /// Every outstanding request is rejected with
    /// [`Error::ConnectionClosed`] rather than left to time out.
    pub fn close(&self) {
        let _ = self.command_tx.send(TransportCommand::Close);
    }

    // ========================================================================
    // Event Loop
    // ========================================================================

    /// Event loop that owns the WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
        pending: Arc<Mutex<PendingMap>>,
        context_watcher: Arc<Mutex<ContextWatcher>>,
        connected: Arc<AtomicBool>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Inbound frames from the endpoint
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_inbound_frame(&text, &pending, &context_watcher);
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

                // Outbound commands from the Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(TransportCommand::Send { call, tx }) => {
                            Self::handle_send_command(call, tx, &mut ws_write, &pending).await;
                        }

                        Some(TransportCommand::RemovePending(request_id)) => {
                            if let Some(entry) = pending.lock().remove(&request_id) {
                                debug!(
                                    %request_id,
                                    method = %entry.method,
                                    elapsed_ms = entry.created_at.elapsed().as_millis() as u64,
                                    "Removed timed-out request"
                                );
                            }
                        }

                        Some(TransportCommand::Close) => {
                            debug!("Close requested");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        connected.store(false, Ordering::Release);
        Self::fail_pending(&pending);

        debug!("Session event loop terminated");
    }

    /// Decodes one inbound text frame and dispatches it.
    fn handle_inbound_frame(
        text: &str,
        pending: &Arc<Mutex<PendingMap>>,
        context_watcher: &Arc<Mutex<ContextWatcher>>,
    ) {
        let frame = match InboundFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, text = %text, "Dropping undecodable frame");
                return;
            }
        };

        match frame {
            InboundFrame::Response(response) => {
                let entry = pending.lock().remove(&response.id);

                match entry {
                    Some(entry) => {
                        trace!(
                            id = %response.id,
                            method = %entry.method,
                            elapsed_ms = entry.created_at.elapsed().as_millis() as u64,
                            "Response correlated"
                        );
                        let _ = entry.tx.send(response.into_result());
                    }
                    // Late response after timeout, or never ours.
                    None => trace!(id = %response.id, "Dropping response for unknown id"),
                }
            }

            InboundFrame::Event(event) => Self::dispatch_event(event, context_watcher),
        }
    }

    /// Routes a decoded event.
    fn dispatch_event(event: Event, context_watcher: &Arc<Mutex<ContextWatcher>>) {
        if event.method == EXECUTION_CONTEXT_CREATED {
            let watcher = context_watcher.lock();
            match watcher.as_ref() {
                Some(tx) => {
                    let _ = tx.send(event.params);
                }
                None => trace!("Context-created event with no watcher registered"),
            }
            return;
        }

        trace!(method = %event.method, "Dropping unhandled event");
    }

    /// Sends one call over the socket, registering its pending entry first.
    async fn handle_send_command(
        call: MethodCall,
        tx: oneshot::Sender<Result<Value>>,
        ws_write: &mut WsSink,
        pending: &Arc<Mutex<PendingMap>>,
    ) {
        let request_id = call.id;

        let json = match to_string(&call) {
            Ok(j) => j,
            Err(e) => {
                let _ = tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Register before sending so a fast response always finds its entry.
        pending.lock().insert(
            request_id,
            PendingEntry {
                method: call.method.clone(),
                created_at: Instant::now(),
                tx,
            },
        );

        if let Err(e) = ws_write.send(Message::Text(json.into())).await
            && let Some(entry) = pending.lock().remove(&request_id)
        {
            let _ = entry.tx.send(Err(Error::connection(e.to_string())));
            return;
        }

        trace!(%request_id, method = %call.method, "Call sent");
    }

    /// Fails every pending request with a connection-closed error.
    fn fail_pending(pending: &Arc<Mutex<PendingMap>>) {
        let drained: Vec<_> = pending.lock().drain().collect();
        let count = drained.len();

        for (_, entry) in drained {
            let _ = entry.tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on close");
        }
    }
}

impl Drop for SessionTransport {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Tests
// ============================================================================
