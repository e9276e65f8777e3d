//! Custom method correlation.
//!
//! Custom methods ride on the one-way event channel: the request is a
//! `web_app_invoke_custom_method` event and the reply a
//! `custom_method_invoked` event carrying the same `req_id`. This module
//! owns the table of calls still waiting for their reply and the future
//! handed back to callers.
//!
//! # Lifecycle
//!
//! 1. [`PendingRequests::reserve`] - Draw an unused id and park a resolver
//! 2. Bridge sends the request event
//! 3. [`PendingRequests::take`] - Reply arrives, resolver removed exactly once
//! 4. [`CustomMethodCall`] resolves with the result or the host error

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::ready;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::{Sleep, sleep};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

// ============================================================================
// Constants
// ============================================================================

/// Attempts at drawing an id that is not already pending.
pub const MAX_REQUEST_ID_ATTEMPTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// One-shot resolver for a pending call.
pub(crate) type Resolver = oneshot::Sender<Result<Value>>;

/// Table shared between the bridge and outstanding calls.
pub(crate) type SharedPending = Arc<Mutex<PendingRequests>>;

// ============================================================================
// PendingRequests
// ============================================================================

/// Correlation id → resolver for calls awaiting a reply.
#[derive(Default)]
pub(crate) struct PendingRequests {
    entries: FxHashMap<RequestId, Resolver>,
}

impl PendingRequests {
    /// Reserves a fresh id using the thread-local generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestIdExhausted`] if every drawn id was pending.
    pub(crate) fn reserve(&mut self) -> Result<(RequestId, oneshot::Receiver<Result<Value>>)> {
        self.reserve_with(RequestId::generate)
    }

    /// Reserves a fresh id drawn from `next_id`.
    pub(crate) fn reserve_with(
        &mut self,
        mut next_id: impl FnMut() -> RequestId,
    ) -> Result<(RequestId, oneshot::Receiver<Result<Value>>)> {
        for _ in 0..MAX_REQUEST_ID_ATTEMPTS {
            let id = next_id();
            if self.entries.contains_key(&id) {
                trace!(%id, "Request id collision, drawing again");
                continue;
            }

            let (tx, rx) = oneshot::channel();
            self.entries.insert(id.clone(), tx);
            return Ok((id, rx));
        }

        Err(Error::request_id_exhausted(MAX_REQUEST_ID_ATTEMPTS))
    }

    /// Removes and returns the resolver for `id`.
    pub(crate) fn take(&mut self, id: &RequestId) -> Option<Resolver> {
        self.entries.remove(id)
    }

    /// Returns `true` if `id` is still pending.
    #[cfg(test)]
    pub(crate) fn contains(&self, id: &RequestId) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of pending calls.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// CustomMethodCall
// ============================================================================

/// Result handle of a custom method call.
///
/// Resolves once, when the matching `custom_method_invoked` reply is
/// dispatched. Without a timeout it stays pending for as long as no reply
/// arrives. Dropping the handle does not cancel the call: the pending entry
/// stays until a reply consumes it.
#[must_use = "a custom method call does nothing observable unless awaited"]
pub struct CustomMethodCall {
    request_id: RequestId,
    receiver: oneshot::Receiver<Result<Value>>,
    pending: Weak<Mutex<PendingRequests>>,
    timeout: Option<Duration>,
    deadline: Option<Pin<Box<Sleep>>>,
}

impl std::fmt::Debug for CustomMethodCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomMethodCall")
            .field("request_id", &self.request_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CustomMethodCall {
    pub(crate) fn new(
        request_id: RequestId,
        receiver: oneshot::Receiver<Result<Value>>,
        pending: &SharedPending,
    ) -> Self {
        Self {
            request_id,
            receiver,
            pending: Arc::downgrade(pending),
            timeout: None,
            deadline: None,
        }
    }

    /// Returns the correlation id sent to the host.
    #[inline]
    #[must_use]
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Bounds the wait for a reply.
    ///
    /// The timer starts on first poll and needs a Tokio runtime with time
    /// enabled. On expiry the pending entry is removed, so a late reply is
    /// discarded, and [`Error::CustomMethodTimeout`] is returned.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.deadline = None;
        self
    }

    /// Awaits the reply and deserializes the result.
    ///
    /// # Errors
    ///
    /// - [`Error::CustomMethodFailed`] if the host reported an error
    /// - [`Error::Json`] if the result does not match `T`
    pub async fn into_typed<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        let value = self.await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Settles the call once the deadline has fired.
    ///
    /// A resolver that is no longer in the table was taken by a reply, so
    /// that reply wins over the timeout.
    fn expire(&mut self) -> Poll<Result<Value>> {
        let removed = self
            .pending
            .upgrade()
            .and_then(|pending| pending.lock().take(&self.request_id));

        if removed.is_none() {
            return match self.receiver.try_recv() {
                Ok(reply) => Poll::Ready(reply),
                // Resolver taken but not sent yet; the receiver waker is armed.
                Err(TryRecvError::Empty) => Poll::Pending,
                Err(TryRecvError::Closed) => Poll::Ready(Err(Error::ReplyDropped)),
            };
        }

        let timeout_ms = self.timeout.map_or(0, |t| t.as_millis() as u64);
        debug!(request_id = %self.request_id, timeout_ms, "Custom method timed out");
        Poll::Ready(Err(Error::custom_method_timeout(
            self.request_id.clone(),
            timeout_ms,
        )))
    }
}

impl Future for CustomMethodCall {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Poll::Ready(reply) = Pin::new(&mut self.receiver).poll(cx) {
            return Poll::Ready(reply.unwrap_or(Err(Error::ReplyDropped)));
        }

        let Some(timeout) = self.timeout else {
            return Poll::Pending;
        };

        let deadline = self.deadline.get_or_insert_with(|| Box::pin(sleep(timeout)));
        ready!(deadline.as_mut().poll(cx));

        self.expire()
    }
}

// ============================================================================
// Tests
// ============================================================================
