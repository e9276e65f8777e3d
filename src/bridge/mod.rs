//! Bridge between a Mini App and its host.
//!
//! # Data Flow
//!
//! ```text
//! outbound:  post_event ──► Transport ──► host
//!
//! inbound:   WebView.receiveEvent ─────────┐
//!            TelegramGameProxy_receiveEvent ┤
//!            TelegramGameProxy.receiveEvent ┼──► receive_event ──► pending RPC
//!            window "message" (nested) ─────┘                 └──► listeners
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`Bridge`] entity and dispatch routine |
//! | `builder` | [`BridgeBuilder`] fluent configuration |
//! | `options` | [`BridgeOptions`] and validation |
//! | `listeners` | Listener registry and [`Subscription`] |
//! | `rpc` | Pending custom method table and [`CustomMethodCall`] |
//! | `receivers` | Host entry point shims |
//! | `iframe` | [`IframeLifecycle`] handshake |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent bridge configuration.
pub mod builder;

/// Bridge entity.
pub mod core;

/// Iframe lifecycle handshake.
pub mod iframe;

/// Listener registry and subscriptions.
pub mod listeners;

/// Construction options.
pub mod options;

mod receivers;

/// Custom method correlation.
pub mod rpc;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BridgeBuilder;
pub use core::Bridge;
pub use iframe::IframeLifecycle;
pub use listeners::{Listener, Subscription};
pub use options::BridgeOptions;
pub use rpc::{CustomMethodCall, MAX_REQUEST_ID_ATTEMPTS};
