//! Dispatch benchmark suite.
//!
//! Benchmarks the inbound and custom method paths against an in-memory host:
//! - Listener fan-out: 1, 16, 256 listeners per event type
//! - Custom method round trip: invoke, reply, await
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

use mini_app_bridge::{Bridge, MemoryHost, OutgoingEvent, ReceiverEntryPoint};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const LISTENER_COUNTS: &[usize] = &[1, 16, 256];

// ============================================================================
// Benchmark: Listener Fan-out
// ============================================================================

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for &count in LISTENER_COUNTS {
        let host = MemoryHost::webview();
        let bridge = Bridge::new(host.clone()).expect("bridge");
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..count {
            let calls = Arc::clone(&calls);
            bridge.on_event("viewport_changed", move |event| {
                black_box(&event.event_data);
                calls.fetch_add(1, Ordering::Relaxed);
            });
        }

        let data = json!({ "height": 640, "is_expanded": true, "is_state_stable": true });
        group.bench_with_input(BenchmarkId::new("listeners", count), &count, |b, _| {
            b.iter(|| host.deliver(ReceiverEntryPoint::WebView, "viewport_changed", data.clone()));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Outbound
// ============================================================================

fn bench_post_event(c: &mut Criterion) {
    let host = MemoryHost::nested_frame();
    let bridge = Bridge::new(host.clone()).expect("bridge");

    c.bench_function("post_event/parent_frame", |b| {
        b.iter(|| {
            bridge.post_event(&OutgoingEvent::SetupBackButton { is_visible: true });
            host.take_sent()
        });
    });
}

// ============================================================================
// Benchmark: Custom Method Round Trip
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let host = MemoryHost::webview();
    let bridge = Bridge::new(host.clone()).expect("bridge");
    let (bridge, host) = (&bridge, &host);

    c.bench_function("custom_method/round_trip", |b| {
        b.to_async(&rt).iter(|| async move {
            let call = bridge
                .invoke_custom_method("getStorageValues", json!({ "keys": ["a"] }))
                .expect("invoke");

            let request_id = match host.take_sent().pop() {
                Some(message) => message
                    .decode()
                    .and_then(|(_, data)| data.get("req_id").cloned())
                    .unwrap_or(Value::Null),
                None => Value::Null,
            };

            host.deliver(
                ReceiverEntryPoint::WebView,
                "custom_method_invoked",
                json!({ "req_id": request_id, "result": { "a": "1" } }),
            );

            call.await.expect("result")
        });
    });
}

criterion_group!(benches, bench_fan_out, bench_post_event, bench_round_trip);
criterion_main!(benches);
