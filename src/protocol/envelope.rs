//! Serialized `{eventType, eventData}` envelope.
//!
//! The `external-notify` and `parent-postMessage` transports carry one JSON
//! string holding both the event type and its data. The parent frame sends
//! inbound events back in the same shape.
//!
//! # Format
//!
//! ```json
//! { "eventType": "viewport_changed", "eventData": { "height": 640 } }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Envelope
// ============================================================================

/// Borrowed outbound envelope.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Envelope<'a> {
    /// Event type literal.
    #[serde(rename = "eventType")]
    pub event_type: &'a str,

    /// Event payload.
    #[serde(rename = "eventData")]
    pub event_data: &'a Value,
}

impl<'a> Envelope<'a> {
    /// Creates an envelope over borrowed parts.
    #[inline]
    #[must_use]
    pub fn new(event_type: &'a str, event_data: &'a Value) -> Self {
        Self {
            event_type,
            event_data,
        }
    }

    /// Serializes the envelope to its JSON string form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// InboundEnvelope
// ============================================================================

/// Owned envelope parsed from a frame message body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundEnvelope {
    /// Event type literal. Missing or `null` parses as empty; a non-string
    /// value fails the whole parse.
    #[serde(rename = "eventType", default)]
    pub event_type: Option<String>,

    /// Event payload. Missing parses as `null`.
    #[serde(rename = "eventData", default)]
    pub event_data: Value,
}

impl InboundEnvelope {
    /// Parses a message body.
    ///
    /// Returns `None` unless the body is a JSON string that decodes to an
    /// object with a non-empty string `eventType`. A non-string `eventType`,
    /// such as a number, is rejected rather than coerced. Anything else is
    /// treated as unrelated cross-frame traffic.
    #[must_use]
    pub fn from_message_data(data: &Value) -> Option<(String, Value)> {
        let text = data.as_str()?;
        let envelope: Self = serde_json::from_str(text).ok()?;

        match envelope.event_type {
            Some(event_type) if !event_type.is_empty() => Some((event_type, envelope.event_data)),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
