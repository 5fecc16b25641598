//! Execution context capture and remote function invocation.
//!
//! A raw transport can send method calls, but executing code needs a
//! known remote global scope. [`ExecutionContext`] runs the
//! initialization protocol that captures the default context's id, then
//! exposes `call_function_on` bound to it.
//!
//! # Initialization Protocol
//!
//! The order is load-bearing:
//!
//! 1. Register the context-created watcher, then `Runtime.enable` so the
//!    endpoint starts announcing contexts (including pre-existing ones).
//! 2. Evaluate the [`Bootstrap`] expression in the remote global scope.
//! 3. Await the context-created event whose `auxData.isDefault` is true;
//!    secondary and isolated contexts are ignored.
//! 4. `Runtime.disable` — nothing consumes further events, and leaving
//!    delivery on adds per-message decode overhead.
//! 5. Store the captured id for every subsequent call.
//!
//! If step 3 produces no matching event within the request timeout the
//! initialization fails; the session is unusable without a context id.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::{Instant, timeout};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::ContextId;
use crate::protocol::runtime::{exception_message, unwrap_remote_value};
use crate::protocol::{CallFunctionOnParams, ContextDescription};
use crate::transport::SessionTransport;

// ============================================================================
// Bootstrap
// ============================================================================

/// Expression evaluated in the remote global scope during initialization.
///
/// A configuration value rather than a hard-coded string, so the binding
/// name and contents can vary by target without touching the transport.
/// The default defines a no-op name-preserving helper (anonymous-function
/// serialization on some runtimes loses the declared name, breaking
/// scripts that reference `.name`) and binds the Electron API object to a
/// well-known global identifier so later calls need not re-resolve it.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    /// Source text of the bootstrap expression.
    expression: String,
}

impl Bootstrap {
    /// Creates a bootstrap from a custom expression.
    #[inline]
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    /// The standard Electron bootstrap.
    #[must_use]
    pub fn electron() -> Self {
        Self::new(
            "globalThis.__name = globalThis.__name ?? ((func) => func); \
             globalThis.electron = globalThis.electron ?? require('electron');",
        )
    }

    /// Returns the expression text.
    #[inline]
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::electron()
    }
}

// ============================================================================
// ExecutionContext
// ============================================================================

/// A remote global scope with a captured context id.
///
/// Exactly one context id is active per live connection: it is set
/// before any `call_function_on` and cleared when the connection drops.
/// Reconnection means a new transport and a fresh initialization.
pub struct ExecutionContext {
    /// Underlying session transport.
    transport: Arc<SessionTransport>,
    /// Active context id, `None` until initialized or after disconnect.
    context_id: Mutex<Option<ContextId>>,
}

impl ExecutionContext {
    /// Creates an uninitialized context on a transport.
    #[inline]
    #[must_use]
    pub fn new(transport: Arc<SessionTransport>) -> Self {
        Self {
            transport,
            context_id: Mutex::new(None),
        }
    }

    /// Creates a context with a caller-supplied id, skipping capture.
    ///
    /// For endpoints where the caller already knows the context id.
    #[inline]
    #[must_use]
    pub fn with_context_id(transport: Arc<SessionTransport>, context_id: ContextId) -> Self {
        Self {
            transport,
            context_id: Mutex::new(Some(context_id)),
        }
    }

    /// Runs the initialization protocol and captures the default
    /// context id.
    ///
    /// # Errors
    ///
    /// - any transport error from the enable/evaluate/disable calls
    /// - [`Error::Protocol`] if no default context is announced within
    ///   the request timeout
    pub async fn initialize(&self, bootstrap: &Bootstrap) -> Result<ContextId> {
        // Watch before enabling so the announcement cannot slip past.
        let mut events = self.transport.watch_context_created();

        self.transport.send("Runtime.enable", json!({})).await?;
        self.transport
            .send(
                "Runtime.evaluate",
                json!({"expression": bootstrap.expression()}),
            )
            .await?;

        let capture = self.await_default_context(&mut events).await;
        self.transport.clear_context_watcher();

        let context_id = capture?;

        self.transport.send("Runtime.disable", json!({})).await?;

        *self.context_id.lock() = Some(context_id);
        debug!(%context_id, "Execution context captured");

        Ok(context_id)
    }

    /// Returns the active context id, if initialized.
    #[inline]
    #[must_use]
    pub fn context_id(&self) -> Option<ContextId> {
        *self.context_id.lock()
    }

    /// Returns `true` once a context id is active.
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.context_id.lock().is_some()
    }

    /// Returns the underlying transport.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &Arc<SessionTransport> {
        &self.transport
    }

    /// Invokes a function declaration in the captured context.
    ///
    /// Sends `Runtime.callFunctionOn` with promises awaited and the
    /// result returned by value, then normalizes the nested response
    /// envelope down to the plain value (`Value::Null` when the call
    /// produced none).
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if no context id is active
    /// - [`Error::ConnectionClosed`] if the transport is down (the
    ///   stored id is cleared; it belongs to the dead connection)
    /// - [`Error::ScriptError`] if the remote evaluation threw
    pub async fn call_function_on(&self, declaration: &str, args: Vec<Value>) -> Result<Value> {
        if !self.transport.is_connected() {
            *self.context_id.lock() = None;
            return Err(Error::ConnectionClosed);
        }

        let context_id = self.context_id().ok_or(Error::NotInitialized)?;

        let params = CallFunctionOnParams::new(declaration, args, context_id);
        let envelope = self
            .transport
            .send("Runtime.callFunctionOn", serde_json::to_value(&params)?)
            .await?;

        if let Some(message) = exception_message(&envelope) {
            return Err(Error::script_error(message));
        }

        Ok(unwrap_remote_value(envelope))
    }

    /// Waits for the default context announcement.
    async fn await_default_context(
        &self,
        events: &mut tokio::sync::mpsc::UnboundedReceiver<Value>,
    ) -> Result<ContextId> {
        let wait = self.transport.request_timeout();
        let deadline = Instant::now() + wait;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::protocol(format!(
                    "no default execution context announced within {}ms",
                    wait.as_millis()
                )));
            }

            let params = match timeout(remaining, events.recv()).await {
                Ok(Some(params)) => params,
                Ok(None) => return Err(Error::ConnectionClosed),
                Err(_) => continue,
            };

            let Some(context) = ContextDescription::from_event_params(&params) else {
                trace!("Context event without a context payload");
                continue;
            };

            if context.is_default() {
                return Ok(context.context_id());
            }

            trace!(id = context.id, "Ignoring non-default context");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::testing::MockRuntime;

    #[tokio::test]
    async fn test_initialize_captures_default_context() {
        let runtime = MockRuntime::start(json!(6)).await;
        let transport = runtime.connect().await;

        let context = ExecutionContext::new(transport);
        let id = context
            .initialize(&Bootstrap::default())
            .await
            .expect("initialize");

        // The mock announces a non-default context first; it must be
        // skipped in favor of the default one.
        assert_eq!(id, ContextId::new(MockRuntime::DEFAULT_CONTEXT_ID));
        assert!(context.is_initialized());

        // Protocol order: enable, evaluate, then disable.
        let methods = runtime.methods();
        assert_eq!(
            methods,
            vec!["Runtime.enable", "Runtime.evaluate", "Runtime.disable"]
        );
    }

    #[tokio::test]
    async fn test_initialize_sends_bootstrap_expression() {
        let runtime = MockRuntime::start(json!(null)).await;
        let transport = runtime.connect().await;

        let context = ExecutionContext::new(transport);
        context
            .initialize(&Bootstrap::new("globalThis.api = 1;"))
            .await
            .expect("initialize");

        let calls = runtime.calls();
        let evaluate = calls
            .iter()
            .find(|c| c["method"] == "Runtime.evaluate")
            .expect("evaluate call");
        assert_eq!(evaluate["params"]["expression"], "globalThis.api = 1;");
    }

    #[tokio::test]
    async fn test_call_function_on_carries_context_id() {
        let runtime = MockRuntime::start(json!(6)).await;
        let transport = runtime.connect().await;

        let context = ExecutionContext::new(transport);
        context
            .initialize(&Bootstrap::default())
            .await
            .expect("initialize");

        let value = context
            .call_function_on("() => 1 + 2 + 3", vec![])
            .await
            .expect("call");
        assert_eq!(value, json!(6));

        let calls = runtime.calls();
        let call = calls
            .iter()
            .find(|c| c["method"] == "Runtime.callFunctionOn")
            .expect("callFunctionOn");
        assert_eq!(
            call["params"]["executionContextId"],
            MockRuntime::DEFAULT_CONTEXT_ID
        );
        assert_eq!(call["params"]["awaitPromise"], true);
        assert_eq!(call["params"]["returnByValue"], true);
    }

    #[tokio::test]
    async fn test_call_function_on_wraps_arguments() {
        let runtime = MockRuntime::start(json!(null)).await;
        let transport = runtime.connect().await;

        let context = ExecutionContext::new(transport);
        context
            .initialize(&Bootstrap::default())
            .await
            .expect("initialize");

        context
            .call_function_on("(a, b) => a + b", vec![json!(1), json!("x")])
            .await
            .expect("call");

        let calls = runtime.calls();
        let call = calls
            .iter()
            .find(|c| c["method"] == "Runtime.callFunctionOn")
            .expect("callFunctionOn");
        assert_eq!(call["params"]["arguments"], json!([{"value": 1}, {"value": "x"}]));
    }

    #[tokio::test]
    async fn test_call_before_initialize_rejects() {
        let runtime = MockRuntime::start(json!(null)).await;
        let transport = runtime.connect().await;

        let context = ExecutionContext::new(transport);
        let err = context
            .call_function_on("() => 1", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotInitialized));
    }

    #[tokio::test]
    async fn test_context_id_override_skips_capture() {
        let runtime = MockRuntime::start(json!(1)).await;
        let transport = runtime.connect().await;

        let context = ExecutionContext::with_context_id(transport, ContextId::new(42));
        assert!(context.is_initialized());

        context
            .call_function_on("() => 1", vec![])
            .await
            .expect("call");

        let calls = runtime.calls();
        assert_eq!(calls[0]["params"]["executionContextId"], 42);
    }

    #[tokio::test]
    async fn test_initialize_times_out_without_default_context() {
        let runtime = MockRuntime::builder()
            .announce_default_context(false)
            .start(json!(null))
            .await;
        let transport = runtime
            .connect_with_timeout(std::time::Duration::from_millis(300))
            .await;

        let context = ExecutionContext::new(transport);
        let err = context.initialize(&Bootstrap::default()).await.unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_remote_exception_surfaces_as_script_error() {
        let runtime = MockRuntime::builder()
            .throw_on_call("Error: boom")
            .start(json!(null))
            .await;
        let transport = runtime.connect().await;

        let context = ExecutionContext::new(transport);
        context
            .initialize(&Bootstrap::default())
            .await
            .expect("initialize");

        let err = context
            .call_function_on("() => { throw new Error('boom') }", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ScriptError { .. }));
        assert!(err.to_string().contains("boom"));
    }
}
