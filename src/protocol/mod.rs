//! DevTools protocol message types.
//!
//! This module defines the JSON frame formats spoken over the debugging
//! WebSocket, plus the payloads returned by HTTP discovery.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `MethodCall` | Local → Remote | Command request `{id, method, params}` |
//! | `Response` | Remote → Local | Correlated result `{id, result}` or error |
//! | `Event` | Remote → Local | Notification `{method, params}` with no id |
//!
//! Inbound text frames are decoded once at the transport boundary into
//! [`InboundFrame`] and dispatched by pattern matching — responses by
//! correlation id, events by method name.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `frame` | Outbound calls and the inbound frame union |
//! | `runtime` | `Runtime.*` parameter and result shapes |
//! | `target` | Discovery payloads (`/json`, `/json/version`) |

// ============================================================================
// Submodules
// ============================================================================

/// Outbound calls and the inbound frame union.
pub mod frame;

/// `Runtime.*` parameter and result shapes.
pub mod runtime;

/// Discovery payloads.
pub mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use frame::{Event, InboundFrame, MethodCall, ProtocolError, Response};
pub use runtime::{
    CallArgument, CallFunctionOnParams, ContextDescription, EXECUTION_CONTEXT_CREATED,
};
pub use target::{DebuggerTarget, VersionInfo};
