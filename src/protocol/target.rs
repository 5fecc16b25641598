//! Discovery payloads returned by the HTTP endpoint.
//!
//! The wire field names are capitalized and hyphenated
//! (`Browser`, `Protocol-Version`, `webSocketDebuggerUrl`); the structs
//! here normalize them to Rust naming while preserving the mapping
//! exactly for wire compatibility.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::{Map, Value};

// ============================================================================
// DebuggerTarget
// ============================================================================

/// One discoverable remote target (`GET /json`).
///
/// Fields pass through unmodified from the JSON array; descriptors carry
/// no lifecycle beyond the HTTP response.
#[derive(Debug, Clone, Deserialize)]
pub struct DebuggerTarget {
    /// Target identifier.
    #[serde(default)]
    pub id: String,

    /// Human-readable title.
    #[serde(default)]
    pub title: String,

    /// Target kind (`page`, `node`, `background_page`, ...).
    #[serde(rename = "type", default)]
    pub target_type: String,

    /// URL currently loaded in the target.
    #[serde(default)]
    pub url: String,

    /// WebSocket URL for attaching a debugger, when available.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,

    /// Any remaining descriptor fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DebuggerTarget {
    /// Returns `true` if this target is a debuggable page.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

// ============================================================================
// VersionInfo
// ============================================================================

/// Endpoint version information (`GET /json/version`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    /// Browser product string.
    #[serde(rename = "Browser", default)]
    pub browser: String,

    /// Debugging protocol version.
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,

    /// Browser-level WebSocket URL, when the endpoint exposes one.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
