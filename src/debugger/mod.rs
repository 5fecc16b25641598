//! Debugger facade: discovery, attach, and the live session.
//!
//! [`Debugger`] holds validated configuration; [`Debugger::attach`] runs
//! the full startup sequence — wait for the port, discover a debuggable
//! target over HTTP, connect the WebSocket, capture the execution
//! context — and yields a [`DebugSession`] ready to execute scripts.
//!
//! # Example
//!
//! ```no_run
//! use electron_debugger::{Debugger, Result};
//!
//! # async fn example() -> Result<()> {
//! let debugger = Debugger::builder().port(9229).build()?;
//! let session = debugger.attach().await?;
//!
//! let name = session
//!     .execute("(electron) => electron.app.getName()", &[])
//!     .await?;
//! println!("App name: {name}");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for debugger configuration.
pub mod builder;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::context::{Bootstrap, ExecutionContext};
use crate::discovery::DiscoveryClient;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::executor::{RemoteExecutor, SyncHook};
use crate::identifiers::ContextId;
use crate::transport::SessionTransport;

pub use builder::DebuggerBuilder;

// ============================================================================
// Debugger
// ============================================================================

/// Configured entry point for attaching to a debugging endpoint.
#[derive(Debug)]
pub struct Debugger {
    /// Endpoint configuration.
    endpoint: Endpoint,
    /// Bootstrap evaluated during context initialization.
    bootstrap: Bootstrap,
    /// Caller-supplied context id, skipping capture when present.
    context_override: Option<ContextId>,
}

impl Debugger {
    /// Returns a builder for configuring a debugger.
    #[inline]
    #[must_use]
    pub fn builder() -> DebuggerBuilder {
        DebuggerBuilder::new()
    }

    /// Creates a debugger from validated configuration.
    pub(crate) fn new(
        endpoint: Endpoint,
        bootstrap: Bootstrap,
        context_override: Option<ContextId>,
    ) -> Self {
        Self {
            endpoint,
            bootstrap,
            context_override,
        }
    }

    /// Returns the configured endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Attaches to the endpoint and initializes a session.
    ///
    /// # Errors
    ///
    /// - [`Error::PortTimeout`] if the port never opens
    /// - [`Error::Discovery`] / [`Error::Parse`] from target discovery
    /// - [`Error::Protocol`] if no target exposes a WebSocket URL, or
    ///   no default execution context is announced
    /// - [`Error::Connection`] if the WebSocket handshake fails
    pub async fn attach(&self) -> Result<DebugSession> {
        let discovery = DiscoveryClient::new(self.endpoint.clone())?;
        let ws_url = self.resolve_ws_url(&discovery).await?;
        validate_ws_url(&ws_url)?;

        let transport =
            Arc::new(SessionTransport::connect(&ws_url, self.endpoint.timeout).await?);

        let context = match self.context_override {
            Some(id) => {
                debug!(%id, "Using caller-supplied execution context id");
                Arc::new(ExecutionContext::with_context_id(
                    Arc::clone(&transport),
                    id,
                ))
            }
            None => {
                let context = Arc::new(ExecutionContext::new(Arc::clone(&transport)));
                context.initialize(&self.bootstrap).await?;
                context
            }
        };

        info!(endpoint = %self.endpoint, "Attached to debugging endpoint");

        Ok(DebugSession {
            transport,
            executor: RemoteExecutor::new(context),
        })
    }

    /// Picks the WebSocket URL to attach to.
    ///
    /// Prefers a page-type target from `/json` (Electron windows appear
    /// as pages), then any target with a debugger URL, then the
    /// browser-level URL from `/json/version`.
    async fn resolve_ws_url(&self, discovery: &DiscoveryClient) -> Result<String> {
        let targets = discovery.list().await?;

        let page_url = targets
            .iter()
            .filter(|t| t.is_page())
            .find_map(|t| t.web_socket_debugger_url.clone());
        if let Some(url) = page_url {
            debug!(%url, "Attaching to page target");
            return Ok(url);
        }

        let any_url = targets
            .iter()
            .find_map(|t| t.web_socket_debugger_url.clone());
        if let Some(url) = any_url {
            debug!(%url, "Attaching to non-page target");
            return Ok(url);
        }

        let version = discovery.version().await?;
        version.web_socket_debugger_url.ok_or_else(|| {
            Error::protocol(format!(
                "no debuggable target at {} exposes a WebSocket URL",
                self.endpoint
            ))
        })
    }
}

/// Rejects malformed or non-WebSocket debugger URLs before the
/// handshake is attempted.
fn validate_ws_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::protocol(format!("invalid WebSocket URL {raw:?}: {e}")))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        other => Err(Error::protocol(format!(
            "debugger URL {raw:?} has scheme {other:?}, expected ws or wss"
        ))),
    }
}

// ============================================================================
// DebugSession
// ============================================================================

/// A live, initialized session against the debugging endpoint.
pub struct DebugSession {
    /// Underlying transport, shared with the executor's context.
    transport: Arc<SessionTransport>,
    /// Remote execution surface.
    executor: RemoteExecutor,
}

impl DebugSession {
    /// Executes function source in the remote process.
    ///
    /// See [`RemoteExecutor::execute`].
    ///
    /// # Errors
    ///
    /// Same as [`RemoteExecutor::execute`].
    pub async fn execute(&self, script: &str, args: &[Value]) -> Result<Value> {
        self.executor.execute(script, args).await
    }

    /// Executes without notifying the sync hook.
    ///
    /// # Errors
    ///
    /// Same as [`RemoteExecutor::execute`].
    pub async fn execute_internal(&self, script: &str, args: &[Value]) -> Result<Value> {
        self.executor.execute_internal(script, args).await
    }

    /// Installs the call-log synchronization hook.
    pub fn set_sync_hook(&self, hook: SyncHook) {
        self.executor.set_sync_hook(hook);
    }

    /// Returns the remote executor.
    #[inline]
    #[must_use]
    pub fn executor(&self) -> &RemoteExecutor {
        &self.executor
    }

    /// Returns the underlying transport.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &Arc<SessionTransport> {
        &self.transport
    }

    /// Returns `true` while the connection is up.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Closes the session, rejecting any in-flight calls.
    pub fn close(&self) {
        self.transport.close();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::testing::MockRuntime;

    /// Serves `/json` with a one-page target list pointing at the mock
    /// runtime's WebSocket URL.
    async fn start_discovery_fixture(ws_url: String) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let ws_url = ws_url.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 1024];
                    let Ok(n) = stream.read(&mut buf).await else {
                        return;
                    };
                    if n == 0 {
                        return;
                    }

                    let body = json!([{
                        "id": "MOCK",
                        "title": "Electron Main",
                        "type": "page",
                        "url": "file:///app/index.html",
                        "webSocketDebuggerUrl": ws_url,
                    }])
                    .to_string();

                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });

        port
    }

    #[tokio::test]
    async fn test_attach_and_execute_end_to_end() {
        crate::testing::init_tracing();
        let runtime = MockRuntime::start(json!(6)).await;
        let http_port = start_discovery_fixture(runtime.ws_url()).await;

        let debugger = Debugger::builder()
            .host("127.0.0.1")
            .port(http_port)
            .build()
            .expect("build");

        let session = debugger.attach().await.expect("attach");
        assert!(session.is_connected());

        let value = session
            .execute("(electron) => 1 + 2 + 3", &[])
            .await
            .expect("execute");
        assert_eq!(value, json!(6));

        // The declaration crossed the wire with its first parameter
        // stripped and the captured context id attached.
        let calls = runtime.calls();
        let call = calls
            .iter()
            .find(|c| c["method"] == "Runtime.callFunctionOn")
            .expect("callFunctionOn");
        assert_eq!(call["params"]["functionDeclaration"], "() => 1 + 2 + 3");
        assert_eq!(
            call["params"]["executionContextId"],
            MockRuntime::DEFAULT_CONTEXT_ID
        );
    }

    #[tokio::test]
    async fn test_attach_with_context_override_skips_capture() {
        let runtime = MockRuntime::start(json!(1)).await;
        let http_port = start_discovery_fixture(runtime.ws_url()).await;

        let debugger = Debugger::builder()
            .host("127.0.0.1")
            .port(http_port)
            .execution_context_id(42)
            .build()
            .expect("build");

        let session = debugger.attach().await.expect("attach");
        session
            .execute("(electron) => 1", &[])
            .await
            .expect("execute");

        // No initialization handshake: the first call on the wire is
        // the function invocation itself, bound to the supplied id.
        let methods = runtime.methods();
        assert_eq!(methods, vec!["Runtime.callFunctionOn"]);
        let calls = runtime.calls();
        assert_eq!(calls[0]["params"]["executionContextId"], 42);
    }

    #[test]
    fn test_validate_ws_url() {
        assert!(validate_ws_url("ws://127.0.0.1:9229/devtools/page/A").is_ok());
        assert!(validate_ws_url("wss://host/devtools/browser/B").is_ok());
        assert!(validate_ws_url("http://127.0.0.1:9229/json").is_err());
        assert!(validate_ws_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_close_disconnects_session() {
        let runtime = MockRuntime::start(json!(null)).await;
        let http_port = start_discovery_fixture(runtime.ws_url()).await;

        let debugger = Debugger::builder()
            .host("127.0.0.1")
            .port(http_port)
            .build()
            .expect("build");

        let session = debugger.attach().await.expect("attach");
        session.close();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(!session.is_connected());
        let err = session
            .execute("(electron) => 1", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }
}
