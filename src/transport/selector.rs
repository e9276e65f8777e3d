//! Transport detection and outbound delivery.
//!
//! Detection runs once, when the bridge is constructed, and checks signals
//! in fixed priority order:
//!
//! 1. webview proxy present → [`TransportKind::WebviewProxy`]
//! 2. external `notify` present → [`TransportKind::ExternalNotify`]
//! 3. page is nested → [`TransportKind::ParentFrame`]
//!
//! The selected [`Transport`] never changes afterwards.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::host::{self, ExternalNotify, HostEnvironment, ParentFrame, WebviewProxy};
use crate::protocol::Envelope;

// ============================================================================
// Constants
// ============================================================================

/// Target origin that lets any parent receive messages.
pub const ANY_ORIGIN: &str = "*";

// ============================================================================
// TransportKind
// ============================================================================

/// Which mechanism the bridge uses to reach the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// `TelegramWebviewProxy.postEvent(type, data)`.
    WebviewProxy,
    /// `external.notify(envelope)`.
    ExternalNotify,
    /// `parent.postMessage(envelope, origin)`.
    ParentFrame,
}

impl TransportKind {
    /// Returns the host call this transport makes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WebviewProxy => "window.TelegramWebviewProxy.postEvent",
            Self::ExternalNotify => "window.external.notify",
            Self::ParentFrame => "window.parent.postMessage",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Transport
// ============================================================================

/// The single send strategy selected for this page.
#[derive(Clone)]
pub enum Transport {
    /// Two positional arguments: type and JSON data.
    WebviewProxy(Arc<dyn WebviewProxy>),

    /// One JSON envelope string.
    ExternalNotify(Arc<dyn ExternalNotify>),

    /// One JSON envelope string plus a target origin.
    ParentFrame {
        /// Parent frame handle.
        frame: Arc<dyn ParentFrame>,
        /// Origin passed to `postMessage`.
        target_origin: String,
    },
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentFrame { target_origin, .. } => f
                .debug_struct("ParentFrame")
                .field("target_origin", target_origin)
                .finish(),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

impl Transport {
    /// Detects the transport exposed by the host.
    ///
    /// # Arguments
    ///
    /// * `host` - Hosting environment to inspect
    /// * `target_origin` - Origin used if the parent frame transport is chosen
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportUnavailable`] if no signal is present.
    pub fn detect(host: &dyn HostEnvironment, target_origin: &str) -> Result<Self> {
        Self::detect_with_nesting(host, host::is_nested(host), target_origin)
    }

    /// Detects the transport using an already computed nesting flag.
    ///
    /// The host frame position is not inspected again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportUnavailable`] if no signal is present.
    pub fn detect_with_nesting(
        host: &dyn HostEnvironment,
        nested: bool,
        target_origin: &str,
    ) -> Result<Self> {
        let transport = if let Some(proxy) = host.webview_proxy() {
            Self::WebviewProxy(proxy)
        } else if let Some(notify) = host.external_notify() {
            Self::ExternalNotify(notify)
        } else if nested
            && let Some(frame) = host.parent_frame()
        {
            Self::ParentFrame {
                frame,
                target_origin: target_origin.to_string(),
            }
        } else {
            return Err(Error::TransportUnavailable);
        };

        debug!(transport = %transport.kind(), "Transport detected");
        Ok(transport)
    }

    /// Returns the kind of this transport.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::WebviewProxy(_) => TransportKind::WebviewProxy,
            Self::ExternalNotify(_) => TransportKind::ExternalNotify,
            Self::ParentFrame { .. } => TransportKind::ParentFrame,
        }
    }

    /// Delivers one event to the host.
    ///
    /// Host-side delivery is fire-and-forget; only local serialization can
    /// fail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `event_data` cannot be serialized.
    pub fn send(&self, event_type: &str, event_data: &Value) -> Result<()> {
        match self {
            Self::WebviewProxy(proxy) => {
                let data = serde_json::to_string(event_data)?;
                proxy.post_event(event_type, &data);
            }
            Self::ExternalNotify(notify) => {
                let message = Envelope::new(event_type, event_data).to_json()?;
                notify.notify(&message);
            }
            Self::ParentFrame {
                frame,
                target_origin,
            } => {
                let message = Envelope::new(event_type, event_data).to_json()?;
                frame.post_message(&message, target_origin);
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::host::{MemoryHost, SentMessage};

    #[test]
    fn test_detects_webview_proxy() {
        let host = MemoryHost::webview();
        let transport = Transport::detect(&host, ANY_ORIGIN).expect("detect");
        assert_eq!(transport.kind(), TransportKind::WebviewProxy);
    }

    #[test]
    fn test_detects_external_notify() {
        let host = MemoryHost::top_level().with_external_notify();
        let transport = Transport::detect(&host, ANY_ORIGIN).expect("detect");
        assert_eq!(transport.kind(), TransportKind::ExternalNotify);
    }

    #[test]
    fn test_detects_parent_frame() {
        let host = MemoryHost::nested_frame();
        let transport = Transport::detect(&host, ANY_ORIGIN).expect("detect");
        assert_eq!(transport.kind(), TransportKind::ParentFrame);
    }

    #[test]
    fn test_cross_origin_counts_as_nested() {
        let host = MemoryHost::cross_origin_frame();
        let transport = Transport::detect(&host, ANY_ORIGIN).expect("detect");
        assert_eq!(transport.kind(), TransportKind::ParentFrame);
    }

    #[test]
    fn test_no_signal_fails() {
        let host = MemoryHost::top_level();
        let err = Transport::detect(&host, ANY_ORIGIN).expect_err("no transport");
        assert!(matches!(err, Error::TransportUnavailable));
    }

    #[test]
    fn test_priority_order() {
        let host = MemoryHost::nested_frame()
            .with_external_notify()
            .with_webview_proxy();
        let transport = Transport::detect(&host, ANY_ORIGIN).expect("detect");
        assert_eq!(transport.kind(), TransportKind::WebviewProxy);

        let host = MemoryHost::nested_frame().with_external_notify();
        let transport = Transport::detect(&host, ANY_ORIGIN).expect("detect");
        assert_eq!(transport.kind(), TransportKind::ExternalNotify);
    }

    #[test]
    fn test_wire_shapes() {
        let data = json!({ "is_visible": true });

        let host = MemoryHost::webview();
        Transport::detect(&host, ANY_ORIGIN)
            .expect("detect")
            .send("web_app_setup_back_button", &data)
            .expect("send");
        assert_eq!(
            host.last_sent(),
            Some(SentMessage::ProxyPostEvent {
                event_type: "web_app_setup_back_button".into(),
                event_data: r#"{"is_visible":true}"#.into(),
            })
        );

        let host = MemoryHost::top_level().with_external_notify();
        Transport::detect(&host, ANY_ORIGIN)
            .expect("detect")
            .send("web_app_setup_back_button", &data)
            .expect("send");
        assert_eq!(
            host.last_sent(),
            Some(SentMessage::ExternalNotify {
                message: r#"{"eventType":"web_app_setup_back_button","eventData":{"is_visible":true}}"#
                    .into(),
            })
        );

        let host = MemoryHost::nested_frame();
        Transport::detect(&host, "https://web.telegram.org")
            .expect("detect")
            .send("web_app_setup_back_button", &data)
            .expect("send");
        assert_eq!(
            host.last_sent(),
            Some(SentMessage::PostMessage {
                message: r#"{"eventType":"web_app_setup_back_button","eventData":{"is_visible":true}}"#
                    .into(),
                target_origin: "https://web.telegram.org".into(),
            })
        );
    }

    #[test]
    fn test_transport_kind_display() {
        assert_eq!(
            TransportKind::ParentFrame.to_string(),
            "window.parent.postMessage"
        );
    }
}
