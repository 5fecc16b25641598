//! The caller-facing remote execution surface.
//!
//! [`RemoteExecutor::execute`] takes ordinary function source, strips the
//! conventional first parameter (the implicit remote API object), wraps
//! the remaining arguments as value-carrying parameters, invokes the
//! function in the captured execution context, and hands back the
//! unwrapped result.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use crate::script::strip_first_parameter;

// ============================================================================
// Types
// ============================================================================

/// Hook invoked after each successful non-internal `execute`.
///
/// External collaborator interface: a mock store uses it to re-apply
/// call logs after remote activity. Receives the unwrapped result.
pub type SyncHook = Box<dyn Fn(&Value) + Send + Sync>;

// ============================================================================
// RemoteExecutor
// ============================================================================

/// Executes caller-supplied functions inside the remote process.
pub struct RemoteExecutor {
    /// Initialized execution context.
    context: Arc<ExecutionContext>,
    /// Optional call-log synchronization hook.
    sync_hook: Mutex<Option<SyncHook>>,
}

impl RemoteExecutor {
    /// Creates an executor over an execution context.
    #[inline]
    #[must_use]
    pub fn new(context: Arc<ExecutionContext>) -> Self {
        Self {
            context,
            sync_hook: Mutex::new(None),
        }
    }

    /// Installs the call-log synchronization hook.
    pub fn set_sync_hook(&self, hook: SyncHook) {
        *self.sync_hook.lock() = Some(hook);
    }

    /// Removes the call-log synchronization hook.
    pub fn clear_sync_hook(&self) {
        *self.sync_hook.lock() = None;
    }

    /// Returns the underlying execution context.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Arc<ExecutionContext> {
        &self.context
    }

    /// Executes function source in the remote process.
    ///
    /// The function's first declared parameter stands for the remote
    /// API object and is stripped before the source crosses the wire;
    /// every `arg` is passed by value to the remaining parameters.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let name = executor
    ///     .execute("(electron) => electron.app.getName()", &[])
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidScript`] for empty input
    /// - [`Error::NotInitialized`] when no context is active
    /// - [`Error::UnsupportedScript`] for unrecognized source shapes
    /// - any transport or remote error from the call itself
    pub async fn execute(&self, script: &str, args: &[Value]) -> Result<Value> {
        self.execute_inner(script, args, false).await
    }

    /// Executes without notifying the sync hook.
    ///
    /// For the crate's own bookkeeping calls, which must not trigger
    /// call-log synchronization recursively.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn execute_internal(&self, script: &str, args: &[Value]) -> Result<Value> {
        self.execute_inner(script, args, true).await
    }

    async fn execute_inner(&self, script: &str, args: &[Value], internal: bool) -> Result<Value> {
        if script.trim().is_empty() {
            return Err(Error::invalid_script("script must be function source text"));
        }

        // Fail fast instead of hanging when no context was captured.
        if !self.context.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let declaration = strip_first_parameter(script)?;
        debug!(
            script_len = script.len(),
            declaration_len = declaration.len(),
            "Executing remote script"
        );

        let value = self
            .context
            .call_function_on(&declaration, args.to_vec())
            .await?;

        if !internal
            && let Some(hook) = self.sync_hook.lock().as_ref()
        {
            hook(&value);
        }

        Ok(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
