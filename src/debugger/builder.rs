//! Builder pattern for debugger configuration.
//!
//! Provides a fluent API for configuring and creating [`Debugger`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use electron_debugger::Debugger;
//!
//! # fn example() -> electron_debugger::Result<()> {
//! let debugger = Debugger::builder()
//!     .host("localhost")
//!     .port(9229)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::context::Bootstrap;
use crate::endpoint::{DEFAULT_HOST, Endpoint};
use crate::error::{Error, Result};
use crate::identifiers::ContextId;

use super::Debugger;

// ============================================================================
// DebuggerBuilder
// ============================================================================

/// Builder for configuring a [`Debugger`] instance.
///
/// Use [`Debugger::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct DebuggerBuilder {
    /// Debugging endpoint host.
    host: Option<String>,
    /// Debugging endpoint port.
    port: Option<u16>,
    /// Timeout for readiness, discovery, and per-request deadlines.
    timeout: Option<Duration>,
    /// Bootstrap expression override.
    bootstrap: Option<Bootstrap>,
    /// Execution context id override.
    execution_context_id: Option<u64>,
}

// ============================================================================
// DebuggerBuilder Implementation
// ============================================================================

impl DebuggerBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the debugging endpoint host (default `localhost`).
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the debugging endpoint port.
    ///
    /// Required: this is the value the target process was launched with
    /// (`--remote-debugging-port=N`).
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the timeout applied to port-waits, discovery requests, and
    /// every individual protocol call (default 5s).
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the bootstrap expression evaluated during
    /// initialization.
    #[inline]
    #[must_use]
    pub fn bootstrap(mut self, bootstrap: Bootstrap) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    /// Supplies a known execution context id, skipping capture.
    #[inline]
    #[must_use]
    pub fn execution_context_id(mut self, id: u64) -> Self {
        self.execution_context_id = Some(id);
        self
    }

    /// Builds the debugger with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no port was set
    pub fn build(self) -> Result<Debugger> {
        let Some(port) = self.port else {
            return Err(Error::config("debugging port is required"));
        };

        let host = self.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let endpoint = match self.timeout {
            Some(timeout) => Endpoint::with_timeout(host, port, timeout),
            None => Endpoint::new(host, port),
        };

        Ok(Debugger::new(
            endpoint,
            self.bootstrap.unwrap_or_default(),
            self.execution_context_id.map(ContextId::new),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_port() {
        let err = DebuggerBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_build_defaults() {
        let debugger = DebuggerBuilder::new().port(9229).build().expect("build");
        assert_eq!(debugger.endpoint().host, "localhost");
        assert_eq!(debugger.endpoint().port, 9229);
        assert_eq!(debugger.endpoint().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_build_with_overrides() {
        let debugger = DebuggerBuilder::new()
            .host("127.0.0.1")
            .port(9000)
            .timeout(Duration::from_secs(10))
            .execution_context_id(3)
            .build()
            .expect("build");

        assert_eq!(debugger.endpoint().host, "127.0.0.1");
        assert_eq!(debugger.endpoint().timeout, Duration::from_secs(10));
    }
}
