//! In-memory host.
//!
//! [`MemoryHost`] plays the client side of the protocol inside the process:
//! it exposes whichever transport signals it was configured with, records
//! every outgoing call, and lets the caller push events through each
//! receiver entry point exactly like a real client would.
//!
//! # Example
//!
//! ```ignore
//! use mini_app_bridge::{Bridge, MemoryHost, ReceiverEntryPoint};
//!
//! let host = MemoryHost::top_level().with_webview_proxy();
//! let bridge = Bridge::new(host.clone())?;
//!
//! host.deliver(ReceiverEntryPoint::WebView, "main_button_pressed", serde_json::Value::Null);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;

use super::{
    CrossOriginError, ExternalNotify, HostEnvironment, MessageEvent, MessageListener, ParentFrame,
    ReceiveEventFn, ReceiverEntryPoint, WebviewProxy,
};
use crate::protocol::InboundEnvelope;

// ============================================================================
// FramePosition
// ============================================================================

/// Where the simulated page sits in the frame tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePosition {
    /// Own window is the top window.
    TopLevel,
    /// Nested inside a same-origin parent.
    Nested,
    /// Nested inside a cross-origin parent; checking `top` throws.
    CrossOrigin,
}

// ============================================================================
// SentMessage
// ============================================================================

/// One outgoing call recorded by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    /// `TelegramWebviewProxy.postEvent(eventType, eventData)`.
    ProxyPostEvent {
        /// Event type literal.
        event_type: String,
        /// JSON-serialized data.
        event_data: String,
    },
    /// `external.notify(message)`.
    ExternalNotify {
        /// Serialized envelope.
        message: String,
    },
    /// `parent.postMessage(message, targetOrigin)`.
    PostMessage {
        /// Serialized envelope.
        message: String,
        /// Target origin argument.
        target_origin: String,
    },
}

impl SentMessage {
    /// Decodes the logical `(eventType, eventData)` pair regardless of shape.
    #[must_use]
    pub fn decode(&self) -> Option<(String, Value)> {
        match self {
            Self::ProxyPostEvent {
                event_type,
                event_data,
            } => {
                let data = serde_json::from_str(event_data).ok()?;
                Some((event_type.clone(), data))
            }
            Self::ExternalNotify { message } | Self::PostMessage { message, .. } => {
                InboundEnvelope::from_message_data(&Value::String(message.clone()))
            }
        }
    }
}

// ============================================================================
// MemoryHostState
// ============================================================================

#[derive(Default)]
struct MemoryHostState {
    outbox: Mutex<Vec<SentMessage>>,
    receivers: Mutex<FxHashMap<ReceiverEntryPoint, ReceiveEventFn>>,
    message_listeners: Mutex<Vec<MessageListener>>,
}

impl WebviewProxy for MemoryHostState {
    fn post_event(&self, event_type: &str, event_data: &str) {
        self.outbox.lock().push(SentMessage::ProxyPostEvent {
            event_type: event_type.to_string(),
            event_data: event_data.to_string(),
        });
    }
}

impl ExternalNotify for MemoryHostState {
    fn notify(&self, message: &str) {
        self.outbox.lock().push(SentMessage::ExternalNotify {
            message: message.to_string(),
        });
    }
}

impl ParentFrame for MemoryHostState {
    fn post_message(&self, message: &str, target_origin: &str) {
        self.outbox.lock().push(SentMessage::PostMessage {
            message: message.to_string(),
            target_origin: target_origin.to_string(),
        });
    }
}

// ============================================================================
// MemoryHost
// ============================================================================

/// In-process host environment.
///
/// Cloning shares the recorded state; signal configuration is per value and
/// should be finished before the host is handed to a bridge.
#[derive(Clone)]
pub struct MemoryHost {
    webview_proxy: bool,
    external_notify: bool,
    frame: FramePosition,
    state: Arc<MemoryHostState>,
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("webview_proxy", &self.webview_proxy)
            .field("external_notify", &self.external_notify)
            .field("frame", &self.frame)
            .field("sent", &self.state.outbox.lock().len())
            .finish()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl MemoryHost {
    /// Creates a top-level page with no transport signals.
    #[must_use]
    pub fn top_level() -> Self {
        Self::with_frame(FramePosition::TopLevel)
    }

    /// Creates a page nested inside a same-origin parent.
    #[must_use]
    pub fn nested_frame() -> Self {
        Self::with_frame(FramePosition::Nested)
    }

    /// Creates a page nested inside a cross-origin parent.
    #[must_use]
    pub fn cross_origin_frame() -> Self {
        Self::with_frame(FramePosition::CrossOrigin)
    }

    /// Creates a top-level page exposing a webview proxy.
    #[must_use]
    pub fn webview() -> Self {
        Self::top_level().with_webview_proxy()
    }

    fn with_frame(frame: FramePosition) -> Self {
        Self {
            webview_proxy: false,
            external_notify: false,
            frame,
            state: Arc::new(MemoryHostState::default()),
        }
    }

    /// Exposes a webview proxy.
    #[inline]
    #[must_use]
    pub fn with_webview_proxy(mut self) -> Self {
        self.webview_proxy = true;
        self
    }

    /// Exposes an external `notify` function.
    #[inline]
    #[must_use]
    pub fn with_external_notify(mut self) -> Self {
        self.external_notify = true;
        self
    }

    /// Returns the configured frame position.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> FramePosition {
        self.frame
    }
}

// ============================================================================
// Host-side Driving
// ============================================================================

impl MemoryHost {
    /// Calls the receiver installed at `entry_point`.
    ///
    /// Returns `false` if nothing is installed there.
    pub fn deliver(&self, entry_point: ReceiverEntryPoint, event_type: &str, data: Value) -> bool {
        let receiver = self.state.receivers.lock().get(&entry_point).cloned();

        match receiver {
            Some(receiver) => {
                receiver(event_type, data);
                true
            }
            None => false,
        }
    }

    /// Calls every installed receiver with the same event.
    ///
    /// Mimics clients that deliver one logical event redundantly. Returns
    /// the number of receivers called.
    pub fn deliver_everywhere(&self, event_type: &str, data: Value) -> usize {
        ReceiverEntryPoint::ALL
            .into_iter()
            .filter(|entry| self.deliver(*entry, event_type, data.clone()))
            .count()
    }

    /// Dispatches a window `message` event to every message listener.
    ///
    /// Returns the number of listeners called.
    pub fn post_window_message(&self, event: MessageEvent) -> usize {
        let listeners = self.state.message_listeners.lock().clone();
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Returns `true` if a receiver is installed at `entry_point`.
    #[must_use]
    pub fn has_receiver(&self, entry_point: ReceiverEntryPoint) -> bool {
        self.state.receivers.lock().contains_key(&entry_point)
    }

    /// Returns the number of window `message` listeners.
    #[must_use]
    pub fn message_listener_count(&self) -> usize {
        self.state.message_listeners.lock().len()
    }

    /// Returns a copy of every recorded outgoing call.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.outbox.lock().clone()
    }

    /// Drains the recorded outgoing calls.
    pub fn take_sent(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.state.outbox.lock())
    }

    /// Returns the most recent outgoing call.
    #[must_use]
    pub fn last_sent(&self) -> Option<SentMessage> {
        self.state.outbox.lock().last().cloned()
    }
}

// ============================================================================
// HostEnvironment
// ============================================================================

impl HostEnvironment for MemoryHost {
    fn webview_proxy(&self) -> Option<Arc<dyn WebviewProxy>> {
        self.webview_proxy
            .then(|| Arc::clone(&self.state) as Arc<dyn WebviewProxy>)
    }

    fn external_notify(&self) -> Option<Arc<dyn ExternalNotify>> {
        self.external_notify
            .then(|| Arc::clone(&self.state) as Arc<dyn ExternalNotify>)
    }

    fn parent_frame(&self) -> Option<Arc<dyn ParentFrame>> {
        (self.frame != FramePosition::TopLevel)
            .then(|| Arc::clone(&self.state) as Arc<dyn ParentFrame>)
    }

    fn is_top_level(&self) -> Result<bool, CrossOriginError> {
        match self.frame {
            FramePosition::TopLevel => Ok(true),
            FramePosition::Nested => Ok(false),
            FramePosition::CrossOrigin => Err(CrossOriginError),
        }
    }

    fn install_receiver(&self, entry_point: ReceiverEntryPoint, receiver: ReceiveEventFn) {
        self.state.receivers.lock().insert(entry_point, receiver);
    }

    fn add_message_listener(&self, listener: MessageListener) {
        self.state.message_listeners.lock().push(listener);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    #[test]
    fn test_signals() {
        let host = MemoryHost::top_level();
        assert!(host.webview_proxy().is_none());
        assert!(host.external_notify().is_none());
        assert!(host.parent_frame().is_none());

        let host = MemoryHost::nested_frame().with_external_notify();
        assert!(host.external_notify().is_some());
        assert!(host.parent_frame().is_some());
        assert_eq!(host.is_top_level(), Ok(false));

        let host = MemoryHost::cross_origin_frame();
        assert_eq!(host.is_top_level(), Err(CrossOriginError));
    }

    #[test]
    fn test_records_outgoing_calls() {
        let host = MemoryHost::webview();
        let proxy = host.webview_proxy().expect("proxy");
        proxy.post_event("web_app_ready", "\"\"");

        assert_eq!(
            host.sent(),
            vec![SentMessage::ProxyPostEvent {
                event_type: "web_app_ready".into(),
                event_data: "\"\"".into(),
            }]
        );
        assert_eq!(host.take_sent().len(), 1);
        assert!(host.sent().is_empty());
    }

    #[test]
    fn test_deliver_without_receiver() {
        let host = MemoryHost::top_level();
        assert!(!host.deliver(ReceiverEntryPoint::WebView, "x", Value::Null));
    }

    #[test]
    fn test_deliver_everywhere_counts_receivers() {
        let host = MemoryHost::top_level();
        let calls = Arc::new(AtomicUsize::new(0));

        for entry in [ReceiverEntryPoint::WebView, ReceiverEntryPoint::GameProxy] {
            let calls = Arc::clone(&calls);
            host.install_receiver(
                entry,
                Arc::new(move |_, _| {
                    calls.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        assert_eq!(host.deliver_everywhere("main_button_pressed", Value::Null), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sent_message_decode() {
        let proxy = SentMessage::ProxyPostEvent {
            event_type: "web_app_setup_back_button".into(),
            event_data: r#"{"is_visible":true}"#.into(),
        };
        assert_eq!(
            proxy.decode(),
            Some(("web_app_setup_back_button".into(), json!({ "is_visible": true })))
        );

        let notify = SentMessage::ExternalNotify {
            message: r#"{"eventType":"web_app_ready","eventData":""}"#.into(),
        };
        assert_eq!(notify.decode(), Some(("web_app_ready".into(), json!(""))));
    }
}
