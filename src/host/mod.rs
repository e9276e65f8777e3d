//! Hosting environment abstraction.
//!
//! The bridge never touches a concrete page or webview directly. Everything
//! it needs from the host is expressed by [`HostEnvironment`]:
//!
//! | Need | Method |
//! |------|--------|
//! | Transport signals | [`HostEnvironment::webview_proxy`], [`HostEnvironment::external_notify`], [`HostEnvironment::parent_frame`] |
//! | Frame nesting | [`HostEnvironment::is_top_level`] |
//! | Receiver installation | [`HostEnvironment::install_receiver`], [`HostEnvironment::add_message_listener`] |
//!
//! Installed receivers are process-lifetime state: the host keeps them for
//! as long as the page lives and there is no uninstall.
//!
//! [`MemoryHost`] is an in-process implementation for tests and demos.

// ============================================================================
// Submodules
// ============================================================================

/// In-memory host for tests and demos.
pub mod memory;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::{MemoryHost, SentMessage};

// ============================================================================
// Callback Types
// ============================================================================

/// Receiver installed at a host entry point: `(eventType, eventData)`.
pub type ReceiveEventFn = Arc<dyn Fn(&str, Value) + Send + Sync>;

/// Listener for window `message` events.
pub type MessageListener = Arc<dyn Fn(&MessageEvent) + Send + Sync>;

// ============================================================================
// Host Handles
// ============================================================================

/// Host-injected webview proxy (`window.TelegramWebviewProxy`).
pub trait WebviewProxy: Send + Sync {
    /// Delivers an event as two positional arguments.
    fn post_event(&self, event_type: &str, event_data: &str);
}

/// Host-injected external interface (`window.external.notify`).
pub trait ExternalNotify: Send + Sync {
    /// Delivers a serialized `{eventType, eventData}` envelope.
    fn notify(&self, message: &str);
}

/// Parent frame reachable through `window.parent.postMessage`.
pub trait ParentFrame: Send + Sync {
    /// Posts a serialized envelope to the parent frame.
    fn post_message(&self, message: &str, target_origin: &str);
}

// ============================================================================
// Frame Access
// ============================================================================

/// Comparing the page against the top window threw (cross-origin parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrossOriginError;

impl fmt::Display for CrossOriginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cross-origin access to the top window was denied")
    }
}

impl std::error::Error for CrossOriginError {}

// ============================================================================
// Messages
// ============================================================================

/// Origin of a window `message` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// Sent by the parent frame.
    Parent,
    /// Sent by any other window or frame.
    Other,
}

/// A window `message` event.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// Which window posted the message.
    pub source: MessageSource,
    /// The `data` field, usually a JSON string.
    pub data: Value,
}

impl MessageEvent {
    /// Creates a message posted by the parent frame.
    #[inline]
    #[must_use]
    pub fn from_parent(data: impl Into<Value>) -> Self {
        Self {
            source: MessageSource::Parent,
            data: data.into(),
        }
    }

    /// Creates a message posted by an unrelated window.
    #[inline]
    #[must_use]
    pub fn from_other(data: impl Into<Value>) -> Self {
        Self {
            source: MessageSource::Other,
            data: data.into(),
        }
    }
}

// ============================================================================
// ReceiverEntryPoint
// ============================================================================

/// Global entry points through which hosts deliver events.
///
/// Different client versions call different ones; the bridge installs all
/// of them and funnels them into a single dispatch routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverEntryPoint {
    /// `window.Telegram.WebView.receiveEvent(type, data)`.
    WebView,
    /// Bare `window.TelegramGameProxy_receiveEvent(type, data)`.
    GameProxyFunction,
    /// `window.TelegramGameProxy.receiveEvent(type, data)`.
    GameProxy,
}

impl ReceiverEntryPoint {
    /// Every entry point, in installation order.
    pub const ALL: [Self; 3] = [Self::WebView, Self::GameProxyFunction, Self::GameProxy];

    /// Returns the global path hosts call.
    #[must_use]
    pub const fn global_path(self) -> &'static str {
        match self {
            Self::WebView => "Telegram.WebView.receiveEvent",
            Self::GameProxyFunction => "TelegramGameProxy_receiveEvent",
            Self::GameProxy => "TelegramGameProxy.receiveEvent",
        }
    }
}

impl fmt::Display for ReceiverEntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.global_path())
    }
}

// ============================================================================
// HostEnvironment
// ============================================================================

/// The page or webview the Mini App is running in.
pub trait HostEnvironment: Send + Sync {
    /// Returns the injected webview proxy, if present.
    fn webview_proxy(&self) -> Option<Arc<dyn WebviewProxy>>;

    /// Returns the external interface's `notify` function, if present.
    fn external_notify(&self) -> Option<Arc<dyn ExternalNotify>>;

    /// Returns the parent frame handle, if reachable.
    fn parent_frame(&self) -> Option<Arc<dyn ParentFrame>>;

    /// Returns whether the page's own window is the top-level window.
    ///
    /// # Errors
    ///
    /// Returns [`CrossOriginError`] when the comparison is not permitted.
    fn is_top_level(&self) -> Result<bool, CrossOriginError>;

    /// Installs a receiver at a global entry point, replacing any previous one.
    fn install_receiver(&self, entry_point: ReceiverEntryPoint, receiver: ReceiveEventFn);

    /// Adds a listener for window `message` events.
    fn add_message_listener(&self, listener: MessageListener);
}

/// Returns `true` if the host page runs inside a nested frame.
///
/// A cross-origin error while checking counts as nested.
#[must_use]
pub fn is_nested(host: &dyn HostEnvironment) -> bool {
    match host.is_top_level() {
        Ok(top_level) => !top_level,
        Err(_) => true,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_nested() {
        assert!(!is_nested(&MemoryHost::top_level()));
        assert!(is_nested(&MemoryHost::nested_frame()));
        assert!(is_nested(&MemoryHost::cross_origin_frame()));
    }

    #[test]
    fn test_entry_point_paths() {
        let paths: Vec<_> = ReceiverEntryPoint::ALL
            .iter()
            .map(|entry| entry.global_path())
            .collect();

        assert_eq!(
            paths,
            [
                "Telegram.WebView.receiveEvent",
                "TelegramGameProxy_receiveEvent",
                "TelegramGameProxy.receiveEvent",
            ]
        );
    }

    #[test]
    fn test_message_event_constructors() {
        assert_eq!(MessageEvent::from_parent("x").source, MessageSource::Parent);
        assert_eq!(MessageEvent::from_other("x").source, MessageSource::Other);
    }
}
