//! Iframe lifecycle handshake.
//!
//! A Mini App running inside a web client's iframe is told to apply the
//! client's stylesheet (`set_custom_style`) and may be asked to reload
//! (`reload_iframe`). The page announces `iframe_ready` once it handles
//! both, and `iframe_will_reload` right before it reloads.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::protocol::{IncomingEventType, OutgoingEvent, ParsedEvent};

use super::core::Bridge;
use super::listeners::Subscription;

// ============================================================================
// IframeLifecycle
// ============================================================================

/// Listeners answering the iframe handshake.
#[derive(Debug)]
pub struct IframeLifecycle {
    custom_style: Subscription,
    reload: Subscription,
}

impl IframeLifecycle {
    /// Installs the handshake on a nested bridge.
    ///
    /// Returns `None` without registering anything if the page is not
    /// nested.
    ///
    /// # Arguments
    ///
    /// * `bridge` - Bridge to listen on and announce through
    /// * `on_custom_style` - Called with the stylesheet text of every
    ///   `set_custom_style` event
    /// * `on_reload` - Called after `iframe_will_reload` has been sent
    pub fn install<S, R>(bridge: &Bridge, on_custom_style: S, on_reload: R) -> Option<Self>
    where
        S: Fn(&str) + Send + Sync + 'static,
        R: Fn() + Send + Sync + 'static,
    {
        if !bridge.is_nested() {
            return None;
        }

        let custom_style = bridge.on_event(IncomingEventType::SetCustomStyle, move |event| {
            if let ParsedEvent::SetCustomStyle { css } = event.parse() {
                on_custom_style(&css);
            }
        });

        let weak = bridge.downgrade();
        let reload = bridge.on_event(IncomingEventType::ReloadIframe, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.post_event(&OutgoingEvent::IframeWillReload);
            }
            on_reload();
        });

        bridge.post_event(&OutgoingEvent::IframeReady {
            reload_supported: true,
        });
        debug!("Iframe lifecycle installed");

        Some(Self {
            custom_style,
            reload,
        })
    }

    /// Removes both listeners.
    pub fn uninstall(self) {
        self.custom_style.unsubscribe();
        self.reload.unsubscribe();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::{Value, json};

    use crate::host::{MemoryHost, MessageEvent, ReceiverEntryPoint};

    fn sent_types(host: &MemoryHost) -> Vec<String> {
        host.take_sent()
            .iter()
            .filter_map(|m| m.decode())
            .map(|(event_type, _)| event_type)
            .collect()
    }

    #[test]
    fn test_not_installed_at_top_level() {
        let host = MemoryHost::webview();
        let bridge = Bridge::new(host.clone()).expect("bridge");

        assert!(IframeLifecycle::install(&bridge, |_| {}, || {}).is_none());
        assert!(host.sent().is_empty());
        assert_eq!(bridge.listener_count("reload_iframe"), 0);
    }

    #[test]
    fn test_announces_ready() {
        let host = MemoryHost::nested_frame();
        let bridge = Bridge::new(host.clone()).expect("bridge");

        let _lifecycle = IframeLifecycle::install(&bridge, |_| {}, || {}).expect("nested");

        let (event_type, data) = host.last_sent().and_then(|m| m.decode()).expect("sent");
        assert_eq!(event_type, "iframe_ready");
        assert_eq!(data, json!({ "reload_supported": true }));
    }

    #[test]
    fn test_forwards_custom_style() {
        let host = MemoryHost::nested_frame();
        let bridge = Bridge::new(host.clone()).expect("bridge");
        let styles = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&styles);
        let _lifecycle = IframeLifecycle::install(
            &bridge,
            move |css| log.lock().push(css.to_string()),
            || {},
        )
        .expect("nested");

        host.post_window_message(MessageEvent::from_parent(
            r#"{"eventType":"set_custom_style","eventData":"body{color:red}"}"#,
        ));

        assert_eq!(*styles.lock(), vec!["body{color:red}".to_string()]);
    }

    #[test]
    fn test_reload_announces_before_hook() {
        let host = MemoryHost::nested_frame();
        let bridge = Bridge::new(host.clone()).expect("bridge");
        let seen_at_reload = Arc::new(Mutex::new(Vec::new()));

        let observed_host = host.clone();
        let seen = Arc::clone(&seen_at_reload);
        let _lifecycle = IframeLifecycle::install(
            &bridge,
            |_| {},
            move || *seen.lock() = sent_types(&observed_host),
        )
        .expect("nested");
        host.take_sent();

        host.deliver(ReceiverEntryPoint::WebView, "reload_iframe", Value::Null);

        assert_eq!(*seen_at_reload.lock(), vec!["iframe_will_reload".to_string()]);
    }

    #[test]
    fn test_uninstall_removes_listeners() {
        let host = MemoryHost::nested_frame();
        let bridge = Bridge::new(host.clone()).expect("bridge");

        let lifecycle = IframeLifecycle::install(&bridge, |_| {}, || {}).expect("nested");
        assert_eq!(bridge.listener_count("set_custom_style"), 1);

        lifecycle.uninstall();
        assert_eq!(bridge.listener_count("set_custom_style"), 0);
        assert_eq!(bridge.listener_count("reload_iframe"), 0);
    }
}
