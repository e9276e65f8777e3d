//! Outbound transport layer.
//!
//! This module picks how events reach the host and formats them for it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Bridge (Rust)  │   proxy.postEvent(t, d)      │  Host client    │
//! │                 │   external.notify(env)       │                 │
//! │   Transport ────┼─────────────────────────────►│  (webview /     │
//! │                 │   parent.postMessage(env, o) │   parent frame) │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! 1. `Transport::detect` - Inspect host signals once
//! 2. `Transport::send` - Deliver every outgoing event through the same strategy
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `selector` | Detection and per-strategy wire formatting |

// ============================================================================
// Submodules
// ============================================================================

/// Transport detection and delivery.
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use selector::{ANY_ORIGIN, Transport, TransportKind};
