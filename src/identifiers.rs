//! Type-safe identifiers for protocol entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! # Identifier Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`RequestId`] | Correlates an outbound request with its response |
//! | [`ContextId`] | Identifies a remote execution context |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Global counter backing [`RequestId::next`].
///
/// Process-wide so ids are never reused, even across reconnects.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Correlation id for one outbound request.
///
/// Assigned from a monotonically increasing counter. Responses may arrive
/// out of order; correctness depends solely on matching this id, never on
/// arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocates the next request id.
    ///
    /// Ids are unique for the lifetime of the process.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a request id from a raw value.
    ///
    /// Only useful in tests and when decoding inbound frames.
    #[inline]
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// ContextId
// ============================================================================

/// Numeric id of a remote execution context.
///
/// Captured once during session initialization from the context-created
/// event whose auxiliary data marks it as the default context. Every
/// `Runtime.callFunctionOn` on the connection carries this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(u64);

impl ContextId {
    /// Creates a context id from the wire value.
    #[inline]
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Tests
// ============================================================================
