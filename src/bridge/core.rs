//! Bridge entity.
//!
//! Owns the selected transport, the listener registry and the pending
//! custom method table. Every host entry point funnels into
//! [`BridgeInner::receive_event`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, trace};

use crate::error::Result;
use crate::host::{self, HostEnvironment};
use crate::identifiers::ListenerId;
use crate::protocol::{
    CustomMethodReply, IncomingEvent, InvokeCustomMethodParams, OutgoingEvent,
};
use crate::transport::{Transport, TransportKind};

use super::builder::BridgeBuilder;
use super::listeners::{self, Listener, ListenerRegistry, SharedRegistry, Subscription};
use super::options::BridgeOptions;
use super::receivers;
use super::rpc::{CustomMethodCall, PendingRequests, SharedPending};

// ============================================================================
// Macros
// ============================================================================

/// Per-event trace that is raised to `debug` when debug mode is on.
macro_rules! event_trace {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            debug!($($arg)+);
        } else {
            trace!($($arg)+);
        }
    };
}

// ============================================================================
// BridgeInner
// ============================================================================

/// Shared state behind every [`Bridge`] clone.
pub(crate) struct BridgeInner {
    options: BridgeOptions,
    transport: Transport,
    nested: bool,
    listeners: SharedRegistry,
    pending: SharedPending,
}

impl BridgeInner {
    /// Sends one event through the selected transport.
    pub(crate) fn post(&self, event_type: &str, event_data: Option<Value>) {
        let data = event_data.unwrap_or_else(|| Value::String(String::new()));

        event_trace!(
            self.options.debug,
            event_type,
            event_data = %data,
            transport = %self.transport.kind(),
            "Posting event"
        );

        if let Err(e) = self.transport.send(event_type, &data) {
            error!(event_type, error = %e, "Failed to serialize outgoing event");
        }
    }

    /// Serializes a typed event and sends it.
    pub(crate) fn post_event(&self, event: &OutgoingEvent) {
        match event.event_data() {
            Ok(data) => self.post(event.event_type(), data),
            Err(e) => {
                error!(event_type = event.event_type(), error = %e, "Failed to serialize event payload");
            }
        }
    }

    /// Single dispatch routine shared by every receiver entry point.
    pub(crate) fn receive_event(&self, event_type: &str, event_data: Value) {
        let event = IncomingEvent::new(event_type, event_data);

        event_trace!(
            self.options.debug,
            event_type,
            event_data = %event.event_data,
            "Received event"
        );

        if event.is_custom_method_reply() {
            self.resolve_custom_method(&event.event_data);
        }

        let snapshot = self.listeners.lock().snapshot(event_type);
        if snapshot.is_empty() {
            return;
        }

        let failures = listeners::invoke_all(&event, &snapshot);
        if failures > 0 {
            debug!(event_type, failures, total = snapshot.len(), "Dispatch finished with failures");
        }
    }

    fn resolve_custom_method(&self, event_data: &Value) {
        let Some(reply) = CustomMethodReply::from_event_data(event_data) else {
            trace!("Custom method reply without req_id");
            return;
        };

        let resolver = self.pending.lock().take(&reply.req_id);
        let Some(resolver) = resolver else {
            trace!(request_id = %reply.req_id, "Reply for unknown custom method call");
            return;
        };

        let request_id = reply.req_id.clone();
        if resolver.send(reply.into_result()).is_err() {
            trace!(%request_id, "Custom method caller went away before the reply");
        }
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// Message bridge between a Mini App and its host.
///
/// Cloning is cheap and every clone shares the same transport, listeners and
/// pending calls.
///
/// # Example
///
/// ```ignore
/// let bridge = Bridge::new(host)?;
///
/// let subscription = bridge.on_event("main_button_pressed", |_| {
///     println!("pressed");
/// });
///
/// bridge.post_event(&OutgoingEvent::Ready);
/// subscription.unsubscribe();
/// ```
#[derive(Clone)]
pub struct Bridge {
    pub(crate) inner: Arc<BridgeInner>,
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("transport", &self.inner.transport)
            .field("nested", &self.inner.nested)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bridge - Construction
// ============================================================================

impl Bridge {
    /// Creates a bridge with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportUnavailable`](crate::Error::TransportUnavailable)
    /// if the host exposes no transport.
    pub fn new(host: impl HostEnvironment) -> Result<Self> {
        Self::with_options(host, BridgeOptions::default())
    }

    /// Returns a builder for configuring a bridge.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Creates a bridge with explicit options.
    ///
    /// Detects the transport once and installs every receiver entry point
    /// on the host. Installed receivers live as long as the host keeps them.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) if the options are invalid
    /// - [`Error::TransportUnavailable`](crate::Error::TransportUnavailable)
    ///   if the host exposes no transport
    pub fn with_options(host: impl HostEnvironment, options: BridgeOptions) -> Result<Self> {
        options.validate()?;

        let nested = host::is_nested(&host);
        let transport =
            Transport::detect_with_nesting(&host, nested, &options.trusted_target_origin)?;

        let inner = Arc::new(BridgeInner {
            options,
            transport,
            nested,
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
            pending: Arc::new(Mutex::new(PendingRequests::default())),
        });

        receivers::install(&host, Arc::downgrade(&inner), nested);

        debug!(
            transport = %inner.transport.kind(),
            nested,
            "Bridge initialized"
        );

        Ok(Self { inner })
    }
}

// ============================================================================
// Bridge - Outbound
// ============================================================================

impl Bridge {
    /// Sends an event to the host.
    ///
    /// Delivery is fire-and-forget. A payload that fails to serialize is
    /// logged and dropped.
    pub fn post_event(&self, event: &OutgoingEvent) {
        self.inner.post_event(event);
    }

    /// Sends an event by its raw type literal.
    ///
    /// `None` data is sent as `""`.
    pub fn post_raw_event(&self, event_type: &str, event_data: Option<Value>) {
        self.inner.post(event_type, event_data);
    }
}

// ============================================================================
// Bridge - Listeners
// ============================================================================

impl Bridge {
    /// Registers a listener for an event type.
    ///
    /// Listeners run synchronously in registration order. The returned
    /// handle removes exactly this registration.
    pub fn on_event<F>(&self, event_type: impl AsRef<str>, listener: F) -> Subscription
    where
        F: Fn(&IncomingEvent) + Send + Sync + 'static,
    {
        let event_type = event_type.as_ref();
        let id = ListenerId::next();
        let listener: Listener = Arc::new(listener);

        self.inner.listeners.lock().insert(event_type, id, listener);
        trace!(listener = %id, event_type, "Listener added");

        Subscription::new(event_type, id, &self.inner.listeners)
    }

    /// Registers a listener that removes itself after the first event.
    pub fn once_event<F>(&self, event_type: impl AsRef<str>, listener: F) -> Subscription
    where
        F: Fn(&IncomingEvent) + Send + Sync + 'static,
    {
        let event_type = event_type.as_ref();
        let id = ListenerId::next();
        let registry: Weak<Mutex<ListenerRegistry>> = Arc::downgrade(&self.inner.listeners);
        let owned_type = event_type.to_string();
        let fired = AtomicBool::new(false);

        let wrapper: Listener = Arc::new(move |event: &IncomingEvent| {
            if fired.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(registry) = registry.upgrade() {
                registry.lock().remove(&owned_type, id);
            }
            listener(event);
        });

        self.inner.listeners.lock().insert(event_type, id, wrapper);
        trace!(listener = %id, event_type, "One-shot listener added");

        Subscription::new(event_type, id, &self.inner.listeners)
    }
}

// ============================================================================
// Bridge - Custom Methods
// ============================================================================

impl Bridge {
    /// Invokes a host custom method.
    ///
    /// The request is sent before this returns. The returned call resolves
    /// when the matching reply is dispatched; the default timeout from
    /// [`BridgeOptions::custom_method_timeout`] applies if set.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestIdExhausted`](crate::Error::RequestIdExhausted) if
    ///   no free correlation id could be drawn
    /// - [`Error::Json`](crate::Error::Json) if `params` fails to serialize
    pub fn invoke_custom_method(
        &self,
        method: impl Into<String>,
        params: impl Serialize,
    ) -> Result<CustomMethodCall> {
        let method = method.into();
        let params = serde_json::to_value(params)?;

        let (request_id, receiver) = self.inner.pending.lock().reserve()?;
        let mut call = CustomMethodCall::new(request_id.clone(), receiver, &self.inner.pending);
        if let Some(timeout) = self.inner.options.custom_method_timeout {
            call = call.with_timeout(timeout);
        }

        event_trace!(
            self.inner.options.debug,
            %request_id,
            method = %method,
            "Invoking custom method"
        );

        self.inner
            .post_event(&OutgoingEvent::InvokeCustomMethod(InvokeCustomMethodParams {
                req_id: request_id,
                method,
                params,
            }));

        Ok(call)
    }

    /// Invokes a custom method and deserializes its result.
    ///
    /// # Errors
    ///
    /// Any error of [`invoke_custom_method`](Self::invoke_custom_method) or
    /// of awaiting the call, plus [`Error::Json`](crate::Error::Json) if the
    /// result does not match `T`.
    pub async fn invoke_custom_method_as<T: DeserializeOwned>(
        &self,
        method: impl Into<String>,
        params: impl Serialize,
    ) -> Result<T> {
        self.invoke_custom_method(method, params)?.into_typed().await
    }
}

// ============================================================================
// Bridge - Introspection
// ============================================================================

impl Bridge {
    /// Returns the transport selected at construction.
    #[inline]
    #[must_use]
    pub fn transport_kind(&self) -> TransportKind {
        self.inner.transport.kind()
    }

    /// Returns `true` if the page runs inside a nested frame.
    #[inline]
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.inner.nested
    }

    /// Returns the options the bridge was built with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.inner.options
    }

    /// Returns the number of custom method calls awaiting a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Returns the number of listeners registered for an event type.
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.inner.listeners.lock().len(event_type)
    }

    pub(crate) fn downgrade(&self) -> Weak<BridgeInner> {
        Arc::downgrade(&self.inner)
    }
}

// ============================================================================
// Tests
// ============================================================================
