//! WebSocket transport layer.
//!
//! One [`SessionTransport`](session::SessionTransport) owns one WebSocket
//! connection to the debugging endpoint and multiplexes every outstanding
//! call over it, correlated by numeric id.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                            ┌──────────────────┐
//! │  Caller (Rust)   │                            │  Electron        │
//! │                  │         WebSocket          │  (DevTools       │
//! │  SessionTransport│◄──────────────────────────►│   endpoint)      │
//! │  → event loop    │       {id, method,         │                  │
//! │                  │        params}             │                  │
//! └──────────────────┘                            └──────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! Disconnected → Connecting → Connected → Disconnected. The terminal
//! transition happens on explicit close or fatal socket error; there is
//! no reconnecting state — reconnection is a new transport instance.

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket session and event loop.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use session::SessionTransport;
