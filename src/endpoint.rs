//! Debugging endpoint configuration.
//!
//! An [`Endpoint`] is the immutable `{host, port, timeout}` triple shared by
//! the discovery client and the WebSocket transport. It is created once per
//! session; each endpoint carries its own readiness state and never assumes
//! another endpoint's port is open.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default debugging host.
pub const DEFAULT_HOST: &str = "localhost";

// ============================================================================
// Endpoint
// ============================================================================

/// A remote-debugging endpoint.
///
/// The same host/port pair serves discovery over HTTP (`/json`,
/// `/json/version`) and commands over WebSocket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or IP of the debugging endpoint.
    pub host: String,
    /// TCP port of the debugging endpoint.
    pub port: u16,
    /// Timeout applied to port-waits, discovery requests, and every
    /// individual protocol call.
    pub timeout: Duration,
}

impl Endpoint {
    /// Creates an endpoint with the default timeout.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates an endpoint with a custom timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Returns the HTTP URL for a discovery path.
    ///
    /// # Example
    ///
    /// ```
    /// use electron_debugger::Endpoint;
    ///
    /// let endpoint = Endpoint::new("localhost", 9229);
    /// assert_eq!(endpoint.http_url("/json/version"), "http://localhost:9229/json/version");
    /// ```
    #[must_use]
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, path)
    }

    /// Returns the timeout in milliseconds, for error reporting.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let endpoint = Endpoint::new("localhost", 9229);
        assert_eq!(endpoint.timeout, DEFAULT_TIMEOUT);
        assert_eq!(endpoint.timeout_ms(), 5000);
    }

    #[test]
    fn test_http_url() {
        let endpoint = Endpoint::new("127.0.0.1", 9229);
        assert_eq!(endpoint.http_url("/json"), "http://127.0.0.1:9229/json");
    }

    #[test]
    fn test_display() {
        let endpoint = Endpoint::new("localhost", 9222);
        assert_eq!(endpoint.to_string(), "localhost:9222");
    }
}
