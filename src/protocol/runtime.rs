//! `Runtime.*` parameter and result shapes.
//!
//! Only the slice of the Runtime domain this crate drives is modeled:
//! `enable` / `disable` (no parameters), `evaluate`, `callFunctionOn`, and
//! the `executionContextCreated` event. Everything else rides through as
//! raw [`serde_json::Value`].

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::ContextId;

// ============================================================================
// Constants
// ============================================================================

/// Event announcing a new execution context.
///
/// Its `params.context.id` and `params.context.auxData.isDefault` fields
/// are load-bearing: initialization filters on them to find the default
/// context.
pub const EXECUTION_CONTEXT_CREATED: &str = "Runtime.executionContextCreated";

// ============================================================================
// CallArgument
// ============================================================================

/// One positional argument passed by value to a remote call.
///
/// Arguments containing functions or other non-serializable values are a
/// caller error, not a transform error.
#[derive(Debug, Clone, Serialize)]
pub struct CallArgument {
    /// The serialized value.
    pub value: Value,
}

impl CallArgument {
    /// Wraps a value as a call argument.
    #[inline]
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

// ============================================================================
// CallFunctionOnParams
// ============================================================================

/// Parameters for `Runtime.callFunctionOn`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnParams {
    /// Source text of the function to invoke.
    pub function_declaration: String,

    /// Positional arguments, each passed by value.
    pub arguments: Vec<CallArgument>,

    /// Resolve returned promises before responding.
    pub await_promise: bool,

    /// Serialize the return value instead of handing back a remote
    /// object reference.
    pub return_by_value: bool,

    /// Context to run in.
    pub execution_context_id: ContextId,
}

impl CallFunctionOnParams {
    /// Builds parameters with the conventions this crate always uses:
    /// promises awaited, results returned by value.
    #[must_use]
    pub fn new(declaration: impl Into<String>, args: Vec<Value>, context_id: ContextId) -> Self {
        Self {
            function_declaration: declaration.into(),
            arguments: args.into_iter().map(CallArgument::new).collect(),
            await_promise: true,
            return_by_value: true,
            execution_context_id: context_id,
        }
    }
}

// ============================================================================
// ContextDescription
// ============================================================================

/// Decoded payload of [`EXECUTION_CONTEXT_CREATED`].
#[derive(Debug, Clone, Deserialize)]
pub struct ContextDescription {
    /// Numeric context id.
    pub id: u64,

    /// Auxiliary data; `isDefault` distinguishes the main context from
    /// secondary/isolated ones.
    #[serde(rename = "auxData", default)]
    pub aux_data: Value,
}

impl ContextDescription {
    /// Parses the event params (`{"context": {...}}`).
    ///
    /// Returns `None` when the params do not carry a context object.
    #[must_use]
    pub fn from_event_params(params: &Value) -> Option<Self> {
        serde_json::from_value(params.get("context")?.clone()).ok()
    }

    /// Returns `true` if this is the default execution context.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.aux_data
            .get("isDefault")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns the typed context id.
    #[inline]
    #[must_use]
    pub fn context_id(&self) -> ContextId {
        ContextId::new(self.id)
    }
}

// ============================================================================
// Result Unwrapping
// ============================================================================

/// Extracts the plain returned value from a `Runtime.callFunctionOn` or
/// `Runtime.evaluate` response envelope.
///
/// The interesting value sits at `result.result.value`; calls that
/// produce nothing normalize to `Value::Null`.
#[must_use]
pub fn unwrap_remote_value(envelope: Value) -> Value {
    envelope
        .get("result")
        .and_then(|inner| inner.get("value"))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Extracts a thrown-exception description from a call response, if any.
///
/// Returns the remote error text when `exceptionDetails` is present.
#[must_use]
pub fn exception_message(envelope: &Value) -> Option<String> {
    let details = envelope.get("exceptionDetails")?;
    let text = details
        .get("exception")
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
        .or_else(|| details.get("text").and_then(Value::as_str))
        .unwrap_or("unknown exception");
    Some(text.to_string())
}

// ============================================================================
// Tests
// ============================================================================
