//! Error types for the Electron remote-debugging client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use electron_debugger::{Debugger, Result};
//!
//! async fn example() -> Result<()> {
//!     let debugger = Debugger::builder().port(9229).build()?;
//!     let session = debugger.attach().await?;
//!     session.execute("(electron) => electron.app.getName()", &[]).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Readiness | [`Error::PortTimeout`] |
//! | Discovery | [`Error::Discovery`], [`Error::Parse`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`], [`Error::RequestTimeout`] |
//! | Script | [`Error::UnsupportedScript`], [`Error::InvalidScript`], [`Error::ScriptError`] |
//! | Session | [`Error::NotInitialized`], [`Error::Config`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Http`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Readiness Errors
    // ========================================================================
    /// Debugging port never accepted a connection within the bound.
    ///
    /// Returned by the port waiter when the remote process does not start
    /// listening in time. Transient refusals during polling are expected
    /// and never surface as errors.
    #[error("Port {host}:{port} not reachable after {timeout_ms}ms")]
    PortTimeout {
        /// Host that was probed.
        host: String,
        /// Port that was probed.
        port: u16,
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    // ========================================================================
    // Discovery Errors
    // ========================================================================
    /// Discovery endpoint returned a non-2xx status.
    ///
    /// Carries the raw response body verbatim for diagnostics.
    #[error("Discovery request failed ({status}): {body}")]
    Discovery {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Discovery response body was not valid JSON.
    ///
    /// Distinct from [`Error::Discovery`] so callers can tell a bad
    /// response apart from a protocol-level failure.
    #[error("Failed to parse discovery response: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
        /// Raw body that failed to parse.
        body: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed during the open handshake.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection closed unexpectedly.
    ///
    /// Returned for calls in flight when the socket closes; all pending
    /// requests are failed with this variant.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or remote-end error response.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// An individual request exceeded its deadline.
    ///
    /// Only the named call fails; unrelated requests on the same
    /// connection are unaffected.
    #[error("Request {request_id} ({method}) timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// The protocol method that was in flight.
        method: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Script Errors
    // ========================================================================
    /// Script source is not a recognized top-level function shape.
    #[error("Unsupported script shape: {message}")]
    UnsupportedScript {
        /// Description of the unsupported shape.
        message: String,
    },

    /// Caller passed something other than function source to `execute`.
    #[error("Invalid script argument: {message}")]
    InvalidScript {
        /// Description of the invalid input.
        message: String,
    },

    /// The remote evaluation threw.
    #[error("Remote script error: {message}")]
    ScriptError {
        /// Error message reported by the remote runtime.
        message: String,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// No execution context has been captured yet.
    ///
    /// Returned instead of hanging when `execute` is called before the
    /// session finished initializing (or after a disconnect).
    #[error("Session not initialized: no execution context available")]
    NotInitialized,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a port timeout error.
    #[inline]
    pub fn port_timeout(host: impl Into<String>, port: u16, timeout_ms: u64) -> Self {
        Self::PortTimeout {
            host: host.into(),
            port,
            timeout_ms,
        }
    }

    /// Creates a discovery error from a non-2xx response.
    #[inline]
    pub fn discovery(status: u16, body: impl Into<String>) -> Self {
        Self::Discovery {
            status,
            body: body.into(),
        }
    }

    /// Creates a parse error for a malformed discovery body.
    #[inline]
    pub fn parse(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(
        request_id: RequestId,
        method: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self::RequestTimeout {
            request_id,
            method: method.into(),
            timeout_ms,
        }
    }

    /// Creates an unsupported script error.
    #[inline]
    pub fn unsupported_script(message: impl Into<String>) -> Self {
        Self::UnsupportedScript {
            message: message.into(),
        }
    }

    /// Creates an invalid script error.
    #[inline]
    pub fn invalid_script(message: impl Into<String>) -> Self {
        Self::InvalidScript {
            message: message.into(),
        }
    }

    /// Creates a remote script error.
    #[inline]
    pub fn script_error(message: impl Into<String>) -> Self {
        Self::ScriptError {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::PortTimeout { .. } | Self::RequestTimeout { .. })
    }

    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is a caller error (bad script or arguments).
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedScript { .. } | Self::InvalidScript { .. } | Self::NotInitialized
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
