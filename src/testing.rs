//! Test support: an in-process mock debugging endpoint.
//!
//! Speaks just enough of the wire protocol for the crate's own tests:
//! replies to `Runtime.enable` / `evaluate` / `disable`, announces a
//! secondary and then a default execution context, and answers
//! `Runtime.callFunctionOn` with a configurable value (or a thrown
//! exception). Every inbound call is recorded for assertions.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use crate::transport::SessionTransport;

// ============================================================================
// Tracing
// ============================================================================

/// Installs a test subscriber honoring `RUST_LOG`; repeated calls are
/// no-ops so every test can invoke it unconditionally.
#[allow(dead_code)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// MockRuntimeBuilder
// ============================================================================

/// Behavior knobs for [`MockRuntime`].
pub(crate) struct MockRuntimeBuilder {
    announce_default: bool,
    exception: Option<String>,
}

impl MockRuntimeBuilder {
    /// Whether `Runtime.enable` triggers the default-context
    /// announcement (true by default).
    pub(crate) fn announce_default_context(mut self, announce: bool) -> Self {
        self.announce_default = announce;
        self
    }

    /// Makes every `Runtime.callFunctionOn` respond with a thrown
    /// exception carrying this description.
    pub(crate) fn throw_on_call(mut self, description: &str) -> Self {
        self.exception = Some(description.to_string());
        self
    }

    /// Starts the mock endpoint.
    pub(crate) async fn start(self, call_value: Value) -> MockRuntime {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let calls: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));

        let behavior = Arc::new(Behavior {
            announce_default: self.announce_default,
            exception: self.exception,
            call_value,
        });

        let recorded = Arc::clone(&calls);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let behavior = Arc::clone(&behavior);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let Ok(ws) = accept_async(stream).await else {
                        return;
                    };
                    serve_connection(ws, behavior, recorded).await;
                });
            }
        });

        MockRuntime { port, calls }
    }
}

// ============================================================================
// MockRuntime
// ============================================================================

/// Handle to a running mock endpoint.
pub(crate) struct MockRuntime {
    port: u16,
    calls: Arc<Mutex<Vec<Value>>>,
}

impl MockRuntime {
    /// Context id announced as the default.
    pub(crate) const DEFAULT_CONTEXT_ID: u64 = 5;

    /// Context id announced first, as a non-default decoy.
    pub(crate) const SECONDARY_CONTEXT_ID: u64 = 2;

    /// Starts a mock with default behavior and the given call result.
    pub(crate) async fn start(call_value: Value) -> Self {
        Self::builder().start(call_value).await
    }

    /// Returns a behavior builder.
    pub(crate) fn builder() -> MockRuntimeBuilder {
        MockRuntimeBuilder {
            announce_default: true,
            exception: None,
        }
    }

    /// WebSocket URL of the mock endpoint.
    pub(crate) fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/devtools/page/MOCK", self.port)
    }

    /// Connects a transport with a 2s request timeout.
    pub(crate) async fn connect(&self) -> Arc<SessionTransport> {
        self.connect_with_timeout(Duration::from_secs(2)).await
    }

    /// Connects a transport with a custom request timeout.
    pub(crate) async fn connect_with_timeout(&self, timeout: Duration) -> Arc<SessionTransport> {
        Arc::new(
            SessionTransport::connect(&self.ws_url(), timeout)
                .await
                .expect("connect to mock runtime"),
        )
    }

    /// Snapshot of every recorded inbound call.
    pub(crate) fn calls(&self) -> Vec<Value> {
        self.calls.lock().clone()
    }

    /// Method names of recorded calls, in arrival order.
    pub(crate) fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| c["method"].as_str().map(str::to_string))
            .collect()
    }
}

// ============================================================================
// Connection Handler
// ============================================================================

struct Behavior {
    announce_default: bool,
    exception: Option<String>,
    call_value: Value,
}

async fn serve_connection(
    mut ws: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    behavior: Arc<Behavior>,
    recorded: Arc<Mutex<Vec<Value>>>,
) {
    while let Some(Ok(message)) = ws.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let Ok(call) = serde_json::from_str::<Value>(&text) else {
            continue;
        };

        recorded.lock().push(call.clone());

        let id = call["id"].clone();
        let method = call["method"].as_str().unwrap_or_default().to_string();

        let result = match method.as_str() {
            "Runtime.callFunctionOn" => call_function_result(&behavior),
            _ => json!({}),
        };

        let reply = json!({"id": id, "result": result});
        if ws
            .send(Message::Text(reply.to_string().into()))
            .await
            .is_err()
        {
            break;
        }

        if method == "Runtime.enable" {
            for event in context_announcements(&behavior) {
                if ws
                    .send(Message::Text(event.to_string().into()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }
    }
}

/// Builds the context-created events emitted after `Runtime.enable`.
fn context_announcements(behavior: &Behavior) -> Vec<Value> {
    let mut events = vec![json!({
        "method": "Runtime.executionContextCreated",
        "params": {"context": {
            "id": MockRuntime::SECONDARY_CONTEXT_ID,
            "auxData": {"isDefault": false},
        }},
    })];

    if behavior.announce_default {
        events.push(json!({
            "method": "Runtime.executionContextCreated",
            "params": {"context": {
                "id": MockRuntime::DEFAULT_CONTEXT_ID,
                "auxData": {"isDefault": true},
            }},
        }));
    }

    events
}

/// Builds the `Runtime.callFunctionOn` response envelope.
fn call_function_result(behavior: &Behavior) -> Value {
    if let Some(description) = &behavior.exception {
        return json!({
            "result": {"type": "object"},
            "exceptionDetails": {
                "text": "Uncaught",
                "exception": {"description": description},
            },
        });
    }

    if behavior.call_value.is_null() {
        json!({"result": {"type": "undefined"}})
    } else {
        json!({"result": {"type": "number", "value": behavior.call_value}})
    }
}
