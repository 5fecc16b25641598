//! Electron Debugger - remote-debugging client for Electron apps.
//!
//! This library drives a running Electron application by speaking the
//! DevTools remote-debugging protocol: HTTP for endpoint discovery,
//! one multiplexed WebSocket for command/response and event
//! notification. Callers submit ordinary JavaScript functions to run
//! inside the remote process, with results flowing back as values.
//!
//! # Architecture
//!
//! The startup sequence, leaf-first:
//!
//! - **Port wait**: poll the debugging port until the remote process
//!   starts listening (memoized per endpoint)
//! - **Discovery**: `GET /json` / `GET /json/version` to find a
//!   debuggable target's WebSocket URL
//! - **Session transport**: one WebSocket connection multiplexing every
//!   outstanding call, correlated by monotonically increasing ids
//! - **Execution context**: capture the default remote context's id via
//!   the enable → bootstrap → event → disable handshake
//! - **Remote execution**: strip the conventional first parameter from
//!   caller functions and invoke them via `Runtime.callFunctionOn`
//!
//! # Quick Start
//!
//! ```no_run
//! use electron_debugger::{Debugger, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Attach to an app launched with --remote-debugging-port=9229
//!     let debugger = Debugger::builder().port(9229).build()?;
//!     let session = debugger.attach().await?;
//!
//!     // The first parameter stands for the remote electron API object;
//!     // it is stripped before the source crosses the wire.
//!     let name = session
//!         .execute("(electron) => electron.app.getName()", &[])
//!         .await?;
//!     println!("App name: {name}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`context`] | Execution context capture, [`Bootstrap`] configuration |
//! | [`debugger`] | [`Debugger`] facade and [`DebugSession`] |
//! | [`discovery`] | Port readiness and HTTP target discovery |
//! | [`endpoint`] | [`Endpoint`] configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`executor`] | [`RemoteExecutor`] |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire frame types (internal) |
//! | [`script`] | First-parameter removal transform |
//! | [`transport`] | WebSocket session layer (internal) |
//!
//! # Guarantees
//!
//! - Responses correlate by id only; out-of-order arrival is fine
//! - Timeouts are per-request: a slow call never blocks others
//! - Connection loss fails every pending call immediately
//! - No automatic retry or reconnection — that policy belongs to the
//!   calling orchestrator

// ============================================================================
// Modules
// ============================================================================

/// Execution context capture and bootstrap configuration.
pub mod context;

/// Debugger facade and live session.
pub mod debugger;

/// Endpoint discovery and readiness probing.
pub mod discovery;

/// Debugging endpoint configuration.
pub mod endpoint;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// The caller-facing remote execution surface.
pub mod executor;

/// Type-safe identifiers for protocol entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// DevTools protocol message types.
///
/// Internal module defining call/response/event structures.
pub mod protocol;

/// Remote script marshaling.
pub mod script;

/// WebSocket transport layer.
///
/// Internal module handling the session event loop.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Facade types
pub use debugger::{DebugSession, Debugger, DebuggerBuilder};

// Context types
pub use context::{Bootstrap, ExecutionContext};

// Discovery types
pub use discovery::{DiscoveryClient, PortWaiter};

// Endpoint configuration
pub use endpoint::Endpoint;

// Error types
pub use error::{Error, Result};

// Execution types
pub use executor::{RemoteExecutor, SyncHook};

// Identifier types
pub use identifiers::{ContextId, RequestId};

// Discovery payloads
pub use protocol::{DebuggerTarget, VersionInfo};

// Transport
pub use transport::SessionTransport;
