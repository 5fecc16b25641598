//! TCP port readiness polling.
//!
//! Polls the debugging port at a short fixed interval until it accepts a
//! connection or the timeout elapses. Connection refusals during polling
//! are expected while the remote process starts and never surface as
//! errors; only the final timeout does.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, trace};

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Interval between connection probes.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// PortWaiter
// ============================================================================

/// Polls a TCP port until it is reachable, memoizing success.
///
/// A readiness check precedes every outbound protocol call in this
/// system, so once the port is known open, later waits return
/// immediately without re-probing. Readiness is per-endpoint state;
/// a waiter for one endpoint says nothing about another.
#[derive(Debug)]
pub struct PortWaiter {
    /// Endpoint being probed.
    endpoint: Endpoint,
    /// Set once the port has accepted a connection.
    opened: AtomicBool,
}

impl PortWaiter {
    /// Creates a waiter for the given endpoint.
    #[inline]
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            opened: AtomicBool::new(false),
        }
    }

    /// Waits until the port accepts a connection.
    ///
    /// Returns immediately if an earlier wait already succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PortTimeout`] if the port never opens within the
    /// endpoint's timeout. Never fails on transient refusals.
    pub async fn wait(&self) -> Result<()> {
        if self.opened.load(Ordering::Acquire) {
            return Ok(());
        }

        let addr = format!("{}:{}", self.endpoint.host, self.endpoint.port);
        let deadline = Instant::now() + self.endpoint.timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(endpoint = %self.endpoint, "Port wait timed out");
                return Err(Error::port_timeout(
                    self.endpoint.host.clone(),
                    self.endpoint.port,
                    self.endpoint.timeout_ms(),
                ));
            }

            match timeout(remaining.min(POLL_INTERVAL), TcpStream::connect(&addr)).await {
                Ok(Ok(_stream)) => {
                    self.opened.store(true, Ordering::Release);
                    debug!(endpoint = %self.endpoint, "Port is accepting connections");
                    return Ok(());
                }
                Ok(Err(e)) => {
                    // Refused or unreachable while the process starts.
                    trace!(endpoint = %self.endpoint, error = %e, "Probe failed, retrying");
                }
                Err(_) => {
                    trace!(endpoint = %self.endpoint, "Probe timed out, retrying");
                    continue;
                }
            }

            sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now()))).await;
        }
    }

    /// Returns `true` if the port has been observed open.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }

    /// Returns the endpoint this waiter probes.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

// ============================================================================
// Tests
// ============================================================================
