//! Incoming events (host → Mini App).
//!
//! The host delivers a raw `(eventType, eventData)` pair. [`IncomingEvent`]
//! keeps that pair verbatim so listeners always see exactly what the host
//! sent; [`IncomingEvent::parse`] lifts it into the typed [`ParsedEvent`].
//!
//! Parsing is lenient: payloads are trusted, so a missing field takes its
//! default value instead of failing.
//!
//! # Event Types
//!
//! | Group | Events |
//! |-------|--------|
//! | Buttons | `main_button_pressed`, `back_button_pressed`, `settings_button_pressed` |
//! | Appearance | `viewport_changed`, `theme_changed`, `set_custom_style` |
//! | Popups | `popup_closed`, `qr_text_received`, `scan_qr_popup_closed` |
//! | Permissions | `write_access_requested`, `phone_requested` |
//! | Replies | `custom_method_invoked`, `clipboard_text_received`, `invoice_closed` |
//! | Iframe | `reload_iframe` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::theme::ThemeParams;

// ============================================================================
// Constants
// ============================================================================

/// Reserved event type carrying custom method replies.
pub const CUSTOM_METHOD_INVOKED: &str = "custom_method_invoked";

// ============================================================================
// IncomingEvent
// ============================================================================

/// A raw event received from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingEvent {
    /// Event type literal.
    #[serde(rename = "eventType")]
    pub event_type: String,

    /// Event payload as sent by the host.
    #[serde(rename = "eventData", default)]
    pub event_data: Value,
}

impl IncomingEvent {
    /// Creates an event from its raw parts.
    #[inline]
    #[must_use]
    pub fn new(event_type: impl Into<String>, event_data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            event_data,
        }
    }

    /// Returns the known event type, if any.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<IncomingEventType> {
        self.event_type.parse().ok()
    }

    /// Returns `true` if this is a custom method reply.
    #[inline]
    #[must_use]
    pub fn is_custom_method_reply(&self) -> bool {
        self.event_type == CUSTOM_METHOD_INVOKED
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        self.parse_internal()
    }
}

// ============================================================================
// IncomingEventType
// ============================================================================

/// Known incoming event types.
///
/// Usable wherever an event type string is accepted, e.g.
/// `bridge.on_event(IncomingEventType::ViewportChanged, ..)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncomingEventType {
    /// `main_button_pressed`.
    MainButtonPressed,
    /// `back_button_pressed`.
    BackButtonPressed,
    /// `settings_button_pressed`.
    SettingsButtonPressed,
    /// `invoice_closed`.
    InvoiceClosed,
    /// `viewport_changed`.
    ViewportChanged,
    /// `theme_changed`.
    ThemeChanged,
    /// `popup_closed`.
    PopupClosed,
    /// `write_access_requested`.
    WriteAccessRequested,
    /// `phone_requested`.
    PhoneRequested,
    /// `custom_method_invoked`.
    CustomMethodInvoked,
    /// `clipboard_text_received`.
    ClipboardTextReceived,
    /// `qr_text_received`.
    QrTextReceived,
    /// `scan_qr_popup_closed`.
    ScanQrPopupClosed,
    /// `reload_iframe`.
    ReloadIframe,
    /// `set_custom_style`.
    SetCustomStyle,
}

impl IncomingEventType {
    /// Every known incoming event type.
    pub const ALL: [Self; 15] = [
        Self::MainButtonPressed,
        Self::BackButtonPressed,
        Self::SettingsButtonPressed,
        Self::InvoiceClosed,
        Self::ViewportChanged,
        Self::ThemeChanged,
        Self::PopupClosed,
        Self::WriteAccessRequested,
        Self::PhoneRequested,
        Self::CustomMethodInvoked,
        Self::ClipboardTextReceived,
        Self::QrTextReceived,
        Self::ScanQrPopupClosed,
        Self::ReloadIframe,
        Self::SetCustomStyle,
    ];

    /// Returns the wire event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainButtonPressed => "main_button_pressed",
            Self::BackButtonPressed => "back_button_pressed",
            Self::SettingsButtonPressed => "settings_button_pressed",
            Self::InvoiceClosed => "invoice_closed",
            Self::ViewportChanged => "viewport_changed",
            Self::ThemeChanged => "theme_changed",
            Self::PopupClosed => "popup_closed",
            Self::WriteAccessRequested => "write_access_requested",
            Self::PhoneRequested => "phone_requested",
            Self::CustomMethodInvoked => CUSTOM_METHOD_INVOKED,
            Self::ClipboardTextReceived => "clipboard_text_received",
            Self::QrTextReceived => "qr_text_received",
            Self::ScanQrPopupClosed => "scan_qr_popup_closed",
            Self::ReloadIframe => "reload_iframe",
            Self::SetCustomStyle => "set_custom_style",
        }
    }
}

impl fmt::Display for IncomingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for IncomingEventType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for IncomingEventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::config(format!("unknown incoming event type: {s}")))
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    /// Main button pressed.
    MainButtonPressed,

    /// Back button pressed.
    BackButtonPressed,

    /// Settings button pressed.
    SettingsButtonPressed,

    /// Invoice closed.
    InvoiceClosed {
        /// Invoice slug.
        slug: String,
        /// `paid`, `cancelled`, `pending` or `failed`.
        status: String,
    },

    /// Viewport changed.
    ViewportChanged {
        /// Viewport height in pixels.
        height: f64,
        /// Whether the viewport finished animating.
        is_state_stable: bool,
        /// Whether the Mini App is expanded.
        is_expanded: bool,
    },

    /// Theme changed.
    ThemeChanged {
        /// New theme colors.
        theme_params: ThemeParams,
    },

    /// Popup closed.
    PopupClosed {
        /// Id of the pressed button, if any.
        button_id: Option<String>,
    },

    /// Write access request answered.
    WriteAccessRequested {
        /// `allowed` or `cancelled`.
        status: String,
    },

    /// Phone request answered.
    PhoneRequested {
        /// `sent` or `cancelled`.
        status: String,
    },

    /// Custom method reply.
    CustomMethodInvoked(CustomMethodReply),

    /// Clipboard text received.
    ClipboardTextReceived {
        /// Id from `web_app_read_text_from_clipboard`.
        req_id: String,
        /// Clipboard text, absent when access was denied.
        data: Option<String>,
    },

    /// QR code scanned.
    QrTextReceived {
        /// Decoded text.
        data: String,
    },

    /// QR scanner closed.
    ScanQrPopupClosed,

    /// Parent asks the iframe to reload.
    ReloadIframe,

    /// Parent provides a custom stylesheet.
    SetCustomStyle {
        /// CSS text.
        css: String,
    },

    /// Unknown event type.
    Unknown {
        /// Event type.
        event_type: String,
        /// Event data.
        event_data: Value,
    },
}

// ============================================================================
// CustomMethodReply
// ============================================================================

/// Payload of `custom_method_invoked`.
///
/// Success and failure are mutually exclusive: any present `error` field,
/// including `null`, wins over `result`. Only an absent `error` is success.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMethodReply {
    /// Correlation id of the originating call.
    pub req_id: RequestId,
    /// Result value or host error message.
    pub outcome: ReplyOutcome,
}

/// Outcome of a custom method call as reported by the host.
pub type ReplyOutcome = std::result::Result<Value, String>;

impl CustomMethodReply {
    /// Extracts a reply from raw event data.
    ///
    /// Returns `None` if `req_id` is missing or not a string.
    #[must_use]
    pub fn from_event_data(data: &Value) -> Option<Self> {
        let req_id = data.get("req_id")?.as_str()?;

        let outcome = match data.get("error") {
            None => Ok(data.get("result").cloned().unwrap_or(Value::Null)),
            Some(Value::String(message)) => Err(message.clone()),
            Some(other) => Err(other.to_string()),
        };

        Some(Self {
            req_id: RequestId::from(req_id),
            outcome,
        })
    }

    /// Converts the reply into the caller-facing result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CustomMethodFailed`] carrying the host message.
    pub fn into_result(self) -> Result<Value> {
        self.outcome.map_err(Error::custom_method_failed)
    }
}

// ============================================================================
// Event Parsing Implementation
// ============================================================================

impl IncomingEvent {
    /// Internal parsing implementation.
    fn parse_internal(&self) -> ParsedEvent {
        let Some(kind) = self.kind() else {
            return self.unknown();
        };

        match kind {
            IncomingEventType::MainButtonPressed => ParsedEvent::MainButtonPressed,
            IncomingEventType::BackButtonPressed => ParsedEvent::BackButtonPressed,
            IncomingEventType::SettingsButtonPressed => ParsedEvent::SettingsButtonPressed,

            IncomingEventType::InvoiceClosed => ParsedEvent::InvoiceClosed {
                slug: self.get_string("slug"),
                status: self.get_string("status"),
            },

            IncomingEventType::ViewportChanged => ParsedEvent::ViewportChanged {
                height: self.get_f64("height"),
                is_state_stable: self.get_bool("is_state_stable"),
                is_expanded: self.get_bool("is_expanded"),
            },

            IncomingEventType::ThemeChanged => {
                let params = self
                    .event_data
                    .get("data")
                    .or_else(|| self.event_data.get("theme_params"))
                    .cloned()
                    .unwrap_or(Value::Null);

                ParsedEvent::ThemeChanged {
                    theme_params: serde_json::from_value(params).unwrap_or_default(),
                }
            }

            IncomingEventType::PopupClosed => ParsedEvent::PopupClosed {
                button_id: self.get_optional_string("button_id"),
            },

            IncomingEventType::WriteAccessRequested => ParsedEvent::WriteAccessRequested {
                status: self.get_string("status"),
            },

            IncomingEventType::PhoneRequested => ParsedEvent::PhoneRequested {
                status: self.get_string("status"),
            },

            IncomingEventType::CustomMethodInvoked => {
                match CustomMethodReply::from_event_data(&self.event_data) {
                    Some(reply) => ParsedEvent::CustomMethodInvoked(reply),
                    None => self.unknown(),
                }
            }

            IncomingEventType::ClipboardTextReceived => ParsedEvent::ClipboardTextReceived {
                req_id: self.get_string("req_id"),
                data: self.get_optional_string("data"),
            },

            IncomingEventType::QrTextReceived => ParsedEvent::QrTextReceived {
                data: self.get_string("data"),
            },

            IncomingEventType::ScanQrPopupClosed => ParsedEvent::ScanQrPopupClosed,
            IncomingEventType::ReloadIframe => ParsedEvent::ReloadIframe,

            IncomingEventType::SetCustomStyle => ParsedEvent::SetCustomStyle {
                css: self.event_data.as_str().unwrap_or_default().to_string(),
            },
        }
    }

    #[inline]
    fn unknown(&self) -> ParsedEvent {
        ParsedEvent::Unknown {
            event_type: self.event_type.clone(),
            event_data: self.event_data.clone(),
        }
    }

    /// Gets a string from data.
    #[inline]
    fn get_string(&self, key: &str) -> String {
        self.get_optional_string(key).unwrap_or_default()
    }

    /// Gets an optional string from data.
    #[inline]
    fn get_optional_string(&self, key: &str) -> Option<String> {
        self.event_data
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Gets a number from data.
    #[inline]
    fn get_f64(&self, key: &str) -> f64 {
        self.event_data
            .get(key)
            .and_then(|v| v.as_f64())
            .unwrap_or_default()
    }

    /// Gets a boolean from data.
    #[inline]
    fn get_bool(&self, key: &str) -> bool {
        self.event_data
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
