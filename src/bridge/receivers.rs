//! Host receiver installation.
//!
//! Every entry point is a thin shim that forwards to
//! [`BridgeInner::receive_event`]. Shims hold a weak reference, so a
//! dropped bridge leaves inert receivers behind instead of keeping itself
//! alive through the host.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};

use serde_json::Value;
use tracing::trace;

use crate::host::{HostEnvironment, MessageEvent, MessageSource, ReceiverEntryPoint};
use crate::protocol::InboundEnvelope;

use super::core::BridgeInner;

// ============================================================================
// Installation
// ============================================================================

/// Installs the frame message listener (nested pages only) and all three
/// global receiver entry points.
pub(crate) fn install(host: &dyn HostEnvironment, bridge: Weak<BridgeInner>, nested: bool) {
    if nested {
        let target = bridge.clone();
        host.add_message_listener(Arc::new(move |message: &MessageEvent| {
            on_frame_message(&target, message);
        }));
    }

    for entry_point in ReceiverEntryPoint::ALL {
        let target = bridge.clone();
        host.install_receiver(
            entry_point,
            Arc::new(move |event_type: &str, event_data: Value| {
                if let Some(inner) = target.upgrade() {
                    inner.receive_event(event_type, event_data);
                }
            }),
        );
        trace!(%entry_point, "Receiver installed");
    }
}

/// Accepts only parent-frame messages carrying a well-formed envelope.
fn on_frame_message(bridge: &Weak<BridgeInner>, message: &MessageEvent) {
    if message.source != MessageSource::Parent {
        return;
    }

    let Some((event_type, event_data)) = InboundEnvelope::from_message_data(&message.data) else {
        return;
    };

    if let Some(inner) = bridge.upgrade() {
        inner.receive_event(&event_type, event_data);
    }
}

// ============================================================================
// Tests
// ============================================================================
