//! Mini App event protocol types.
//!
//! This module defines the message format exchanged between the Mini App
//! (this crate) and the hosting client.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | [`OutgoingEvent`] | Mini App → Host | UI commands, custom method calls |
//! | [`IncomingEvent`] | Host → Mini App | Notifications, custom method replies |
//! | [`Envelope`] | Both | `{eventType, eventData}` JSON string |
//!
//! # Event Naming
//!
//! Outgoing events are prefixed `web_app_` (plus a few `iframe_*` and
//! `payment_*` events). Incoming events are plain snake case, e.g.
//! `viewport_changed`.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | Serialized envelope used by notify/postMessage |
//! | `incoming` | Incoming events and custom method replies |
//! | `outgoing` | Outgoing events and their payloads |
//! | `theme` | Theme parameters |

// ============================================================================
// Submodules
// ============================================================================

/// `{eventType, eventData}` envelope.
pub mod envelope;

/// Incoming event types.
pub mod incoming;

/// Outgoing event types.
pub mod outgoing;

/// Theme parameters.
pub mod theme;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{Envelope, InboundEnvelope};
pub use incoming::{
    CUSTOM_METHOD_INVOKED, CustomMethodReply, IncomingEvent, IncomingEventType, ParsedEvent,
    ReplyOutcome,
};
pub use outgoing::{
    ChatType, HapticFeedback, HeaderColor, HeaderColorKey, INVOKE_CUSTOM_METHOD, ImpactStyle,
    InvokeCustomMethodParams, MainButtonParams, NotificationType, OutgoingEvent, PopupButton,
    PopupButtonKind, PopupParams,
};
pub use theme::ThemeParams;
