//! Endpoint discovery and readiness probing.
//!
//! Before anything speaks HTTP or WebSocket to the debugging endpoint, the
//! port has to accept TCP connections — Electron opens it some time after
//! process launch. This module provides:
//!
//! | Module | Description |
//! |--------|-------------|
//! | `port` | TCP readiness polling with memoized success |
//! | `client` | HTTP discovery (`/json`, `/json/version`) |

// ============================================================================
// Submodules
// ============================================================================

/// TCP port readiness polling.
pub mod port;

/// HTTP discovery client.
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::DiscoveryClient;
pub use port::PortWaiter;
