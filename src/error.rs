//! Error types for the Mini App bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use mini_app_bridge::{Bridge, Result};
//!
//! async fn keys(bridge: &Bridge) -> Result<serde_json::Value> {
//!     let call = bridge.invoke_custom_method("getStorageKeys", serde_json::json!({}))?;
//!     call.await
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Construction | [`Error::Config`], [`Error::TransportUnavailable`] |
//! | Custom methods | [`Error::RequestIdExhausted`], [`Error::CustomMethodFailed`], [`Error::CustomMethodTimeout`], [`Error::ReplyDropped`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bridge options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// No transport could be detected in the hosting environment.
    ///
    /// Returned when neither a webview proxy, an external `notify` function,
    /// nor a parent frame is available. The bridge cannot be constructed.
    #[error("Failed to detect Mini App communication method")]
    TransportUnavailable,

    // ========================================================================
    // Custom Method Errors
    // ========================================================================
    /// Could not generate a correlation id that is not already pending.
    #[error("Failed to generate a new request ID after {attempts} attempts")]
    RequestIdExhausted {
        /// Number of ids drawn before giving up.
        attempts: usize,
    },

    /// The host reported a custom method failure.
    ///
    /// The caller may retry the whole call.
    #[error("Custom method failed: {message}")]
    CustomMethodFailed {
        /// Error message provided by the host.
        message: String,
    },

    /// No reply arrived within the requested timeout.
    #[error("Custom method {request_id} timed out after {timeout_ms}ms")]
    CustomMethodTimeout {
        /// Correlation id of the abandoned call.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The bridge owning the pending call was dropped before a reply.
    #[error("Bridge dropped before the custom method replied")]
    ReplyDropped,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a custom method failure carrying the host message.
    #[inline]
    pub fn custom_method_failed(message: impl Into<String>) -> Self {
        Self::CustomMethodFailed {
            message: message.into(),
        }
    }

    /// Creates a correlation id exhaustion error.
    #[inline]
    pub fn request_id_exhausted(attempts: usize) -> Self {
        Self::RequestIdExhausted { attempts }
    }

    /// Creates a custom method timeout error.
    #[inline]
    pub fn custom_method_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::CustomMethodTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error belongs to a single custom method call.
    #[inline]
    #[must_use]
    pub fn is_custom_method_error(&self) -> bool {
        matches!(
            self,
            Self::RequestIdExhausted { .. }
                | Self::CustomMethodFailed { .. }
                | Self::CustomMethodTimeout { .. }
                | Self::ReplyDropped
        )
    }

    /// Returns `true` if this error aborts bridge construction.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::TransportUnavailable)
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed when the whole call is retried.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CustomMethodFailed { .. }
                | Self::CustomMethodTimeout { .. }
                | Self::RequestIdExhausted { .. }
        )
    }

    /// Returns the host-provided message of a failed custom method.
    #[inline]
    #[must_use]
    pub fn custom_method_message(&self) -> Option<&str> {
        match self {
            Self::CustomMethodFailed { message } => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::custom_method_failed("boom");
        assert_eq!(err.to_string(), "Custom method failed: boom");
    }

    #[test]
    fn test_transport_unavailable_display() {
        assert_eq!(
            Error::TransportUnavailable.to_string(),
            "Failed to detect Mini App communication method"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("invalid origin");
        assert_eq!(err.to_string(), "Configuration error: invalid origin");
    }

    #[test]
    fn test_is_custom_method_error() {
        assert!(Error::custom_method_failed("x").is_custom_method_error());
        assert!(Error::request_id_exhausted(100).is_custom_method_error());
        assert!(Error::ReplyDropped.is_custom_method_error());
        assert!(!Error::TransportUnavailable.is_custom_method_error());
    }

    #[test]
    fn test_is_fatal() {
        assert!(Error::TransportUnavailable.is_fatal());
        assert!(Error::config("x").is_fatal());
        assert!(!Error::custom_method_failed("x").is_fatal());
    }

    #[test]
    fn test_is_recoverable() {
        let timeout_err = Error::custom_method_timeout(RequestId::from("abc"), 1000);
        assert!(timeout_err.is_recoverable());
        assert!(!Error::TransportUnavailable.is_recoverable());
    }

    #[test]
    fn test_custom_method_message() {
        let err = Error::custom_method_failed("boom");
        assert_eq!(err.custom_method_message(), Some("boom"));
        assert_eq!(Error::ReplyDropped.custom_method_message(), None);
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
