//! Outbound method calls and the inbound frame union.
//!
//! # Wire Format
//!
//! Outbound:
//!
//! ```json
//! { "id": 1, "method": "Runtime.evaluate", "params": { ... } }
//! ```
//!
//! Inbound response (success or protocol error):
//!
//! ```json
//! { "id": 1, "result": { ... } }
//! { "id": 1, "error": { "code": -32000, "message": "..." } }
//! ```
//!
//! Inbound event (no id):
//!
//! ```json
//! { "method": "Runtime.executionContextCreated", "params": { ... } }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

// ============================================================================
// MethodCall
// ============================================================================

/// A protocol command from the local end to the remote end.
#[derive(Debug, Clone, Serialize)]
pub struct MethodCall {
    /// Correlation id, unique per process.
    pub id: RequestId,

    /// Method name in `Domain.method` format.
    pub method: String,

    /// Method parameters.
    pub params: Value,
}

impl MethodCall {
    /// Creates a new call with an auto-assigned id.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            id: RequestId::next(),
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A correlated response from the remote end.
///
/// Exactly one of `result` / `error` is populated.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the call's `id`.
    pub id: RequestId,

    /// Result payload (if the call succeeded).
    #[serde(default)]
    pub result: Option<Value>,

    /// Protocol-level error (if the call failed remotely).
    #[serde(default)]
    pub error: Option<ProtocolError>,
}

impl Response {
    /// Extracts the result value, surfacing a remote error as [`Error::Protocol`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the remote end reported an error.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(err) => Err(Error::protocol(err.to_string())),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

// ============================================================================
// ProtocolError
// ============================================================================

/// Error shape carried in a failing response frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolError {
    /// Numeric error code.
    #[serde(default)]
    pub code: i64,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,

    /// Optional extra detail.
    #[serde(default)]
    pub data: Option<Value>,
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

// ============================================================================
// Event
// ============================================================================

/// An out-of-band notification from the remote end.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.event` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

// ============================================================================
// InboundFrame
// ============================================================================

/// Union of everything the remote end may send.
///
/// Decoded once per frame; a response is anything carrying an `id`, an
/// event is anything carrying a `method` without one. Frames matching
/// neither shape fail to decode and are logged and dropped by the
/// transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundFrame {
    /// A correlated response to an earlier call.
    Response(Response),
    /// An out-of-band event.
    Event(Event),
}

impl InboundFrame {
    /// Decodes a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed or unrecognized frames.
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_call_serialization() {
        let call = MethodCall {
            id: RequestId::from_raw(1),
            method: "Runtime.evaluate".to_string(),
            params: json!({"expression": "1 + 1"}),
        };

        let text = serde_json::to_string(&call).expect("serialize");
        let value: Value = serde_json::from_str(&text).expect("round trip");

        assert_eq!(value["id"], 1);
        assert_eq!(value["method"], "Runtime.evaluate");
        assert_eq!(value["params"]["expression"], "1 + 1");
    }

    #[test]
    fn test_decode_response() {
        let frame = InboundFrame::decode(r#"{"id": 3, "result": {"value": 6}}"#).expect("decode");

        match frame {
            InboundFrame::Response(response) => {
                assert_eq!(response.id, RequestId::from_raw(3));
                let result = response.into_result().expect("success");
                assert_eq!(result["value"], 6);
            }
            InboundFrame::Event(_) => panic!("decoded response as event"),
        }
    }

    #[test]
    fn test_decode_error_response() {
        let frame = InboundFrame::decode(
            r#"{"id": 4, "error": {"code": -32000, "message": "Cannot find context"}}"#,
        )
        .expect("decode");

        match frame {
            InboundFrame::Response(response) => {
                let err = response.into_result().unwrap_err();
                assert!(matches!(err, Error::Protocol { .. }));
                assert!(err.to_string().contains("Cannot find context"));
            }
            InboundFrame::Event(_) => panic!("decoded response as event"),
        }
    }

    #[test]
    fn test_decode_event() {
        let frame = InboundFrame::decode(
            r#"{"method": "Runtime.executionContextCreated", "params": {"context": {"id": 1}}}"#,
        )
        .expect("decode");

        match frame {
            InboundFrame::Event(event) => {
                assert_eq!(event.method, "Runtime.executionContextCreated");
                assert_eq!(event.params["context"]["id"], 1);
            }
            InboundFrame::Response(_) => panic!("decoded event as response"),
        }
    }

    #[test]
    fn test_decode_malformed() {
        assert!(InboundFrame::decode("not json").is_err());
        assert!(InboundFrame::decode(r#"{"neither": true}"#).is_err());
    }
}
