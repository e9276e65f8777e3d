//! Mini App Bridge - Message bridge between an embedded Mini App and its host.
//!
//! This library connects a Mini App to the messaging client that embeds it.
//! The client exposes one of several incompatible low-level primitives; the
//! bridge picks the one that is present, sends structured events through
//! it, and fans incoming events out to listeners.
//!
//! # Architecture
//!
//! The bridge sits between the app and a [`HostEnvironment`]:
//!
//! - **Outbound**: [`Bridge::post_event`] serializes an [`OutgoingEvent`]
//!   and hands it to the single [`Transport`] chosen at construction
//! - **Inbound**: the host calls any of four entry points, all of which
//!   converge on one dispatch routine
//! - **Custom methods**: request/response calls layered on the one-way
//!   event channel, matched by correlation id
//!
//! Key design principles:
//!
//! - Transport detection runs once; there is no fallback or re-detection
//! - Listeners run synchronously in registration order, each isolated from
//!   the others' panics
//! - No lock is held while calling listeners, resolvers or the host
//!
//! # Quick Start
//!
//! ```no_run
//! use mini_app_bridge::{Bridge, MemoryHost, OutgoingEvent, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let bridge = Bridge::builder()
//!         .debug(true)
//!         .build(MemoryHost::webview())?;
//!
//!     let subscription = bridge.on_event("main_button_pressed", |event| {
//!         println!("pressed: {}", event.event_data);
//!     });
//!
//!     bridge.post_event(&OutgoingEvent::Ready);
//!
//!     let keys: Vec<String> = bridge
//!         .invoke_custom_method_as("getStorageKeys", serde_json::json!({}))
//!         .await?;
//!     println!("keys: {keys:?}");
//!
//!     subscription.unsubscribe();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | [`Bridge`], listeners, custom methods |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | [`HostEnvironment`] abstraction and [`MemoryHost`] |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Event types and wire envelope |
//! | [`transport`] | Transport detection and delivery |

// ============================================================================
// Modules
// ============================================================================

/// Bridge entity, listeners and custom methods.
///
/// - [`Bridge`] - Message bridge
/// - [`Subscription`] - Listener registration handle
/// - [`CustomMethodCall`] - Pending custom method future
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Hosting environment abstraction.
///
/// Implement [`HostEnvironment`] for a real page or webview; use
/// [`MemoryHost`] in tests.
pub mod host;

/// Type-safe identifiers.
///
/// Newtype wrappers for correlation ids and listener registrations.
pub mod identifiers;

/// Mini App event protocol types.
pub mod protocol;

/// Outbound transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{
    Bridge, BridgeBuilder, BridgeOptions, CustomMethodCall, IframeLifecycle, Listener,
    Subscription,
};

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{
    CrossOriginError, ExternalNotify, HostEnvironment, MemoryHost, MessageEvent, MessageSource,
    ParentFrame, ReceiverEntryPoint, SentMessage, WebviewProxy,
};

// Identifier types
pub use identifiers::{ListenerId, RequestId};

// Protocol types
pub use protocol::{
    ChatType, CustomMethodReply, HapticFeedback, HeaderColor, HeaderColorKey, ImpactStyle,
    IncomingEvent, IncomingEventType, MainButtonParams, NotificationType, OutgoingEvent,
    ParsedEvent, PopupButton, PopupButtonKind, PopupParams, ThemeParams,
};

// Transport types
pub use transport::{Transport, TransportKind};
