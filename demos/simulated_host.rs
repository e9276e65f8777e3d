//! Simulated host demonstration.
//!
//! Demonstrates:
//! - Transport detection against an in-memory host
//! - Posting events and inspecting what the host received
//! - Listening for host events through every entry point
//! - Custom method round trip answered by the simulated host
//!
//! Usage:
//!   cargo run --example simulated_host
//!   cargo run --example simulated_host -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use anyhow::Context;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use mini_app_bridge::{
    Bridge, HapticFeedback, IncomingEventType, MemoryHost, NotificationType, OutgoingEvent,
    ParsedEvent, ReceiverEntryPoint,
};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|arg| arg == "--debug");
    init_logging(debug);

    if let Err(e) = run(debug).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "mini_app_bridge=debug"
    } else {
        "mini_app_bridge=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

async fn run(debug: bool) -> anyhow::Result<()> {
    println!("=== Simulated host ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Creating bridge against a webview host...");

    let host = MemoryHost::webview();
    let bridge = Bridge::builder()
        .debug(debug)
        .custom_method_timeout(Duration::from_secs(5))
        .build(host.clone())
        .context("bridge construction")?;
    println!("        ✓ Transport: {}\n", bridge.transport_kind());

    // ========================================================================
    // Outbound
    // ========================================================================

    println!("[1] Posting events...");
    bridge.post_event(&OutgoingEvent::Ready);
    bridge.post_event(&OutgoingEvent::TriggerHapticFeedback(
        HapticFeedback::Notification {
            notification_type: NotificationType::Success,
        },
    ));

    for message in host.take_sent() {
        if let Some((event_type, data)) = message.decode() {
            println!("    → {event_type} {data}");
        }
    }
    println!();

    // ========================================================================
    // Inbound
    // ========================================================================

    println!("[2] Delivering viewport_changed through every entry point...");
    let subscription = bridge.on_event(IncomingEventType::ViewportChanged, |event| {
        if let ParsedEvent::ViewportChanged { height, .. } = event.parse() {
            println!("    ← viewport height {height}");
        }
    });

    for entry in ReceiverEntryPoint::ALL {
        host.deliver(entry, "viewport_changed", json!({ "height": 640, "is_expanded": true }));
    }
    subscription.unsubscribe();
    println!();

    // ========================================================================
    // Custom Method
    // ========================================================================

    println!("[3] Invoking getStorageKeys...");
    let call = bridge.invoke_custom_method("getStorageKeys", json!({}))?;

    let request_id = call.request_id().clone();
    let responder = host.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        responder.deliver(
            ReceiverEntryPoint::WebView,
            "custom_method_invoked",
            json!({ "req_id": request_id, "result": ["theme", "locale"] }),
        );
    });

    let keys: Value = call.await?;
    println!("    ✓ Result: {keys}");
    println!("    Pending calls: {}", bridge.pending_count());

    println!("\n=== Done ===");
    Ok(())
}
