//! Bridge construction options.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use mini_app_bridge::BridgeOptions;
//!
//! let options = BridgeOptions::new()
//!     .with_debug()
//!     .with_trusted_target_origin("https://web.telegram.org")
//!     .with_custom_method_timeout(Duration::from_secs(10));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::transport::ANY_ORIGIN;

// ============================================================================
// BridgeOptions
// ============================================================================

/// Configuration applied when a bridge is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Trace every outgoing send and every dispatched event at `debug` level.
    pub debug: bool,

    /// Target origin passed to `postMessage` when the parent frame transport
    /// is selected.
    pub trusted_target_origin: String,

    /// Default timeout applied to every custom method call.
    ///
    /// `None` leaves unanswered calls pending indefinitely.
    pub custom_method_timeout: Option<Duration>,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl BridgeOptions {
    /// Creates options with debug off, any target origin and no timeout.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            debug: false,
            trusted_target_origin: ANY_ORIGIN.to_string(),
            custom_method_timeout: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BridgeOptions {
    /// Enables debug tracing.
    #[inline]
    #[must_use]
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Sets the `postMessage` target origin.
    #[inline]
    #[must_use]
    pub fn with_trusted_target_origin(mut self, origin: impl Into<String>) -> Self {
        self.trusted_target_origin = origin.into();
        self
    }

    /// Sets the default custom method timeout.
    #[inline]
    #[must_use]
    pub fn with_custom_method_timeout(mut self, timeout: Duration) -> Self {
        self.custom_method_timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BridgeOptions {
    /// Checks the options before a bridge is built.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the target origin is neither `"*"` nor
    /// an `http(s)` origin, or if the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        validate_origin(&self.trusted_target_origin)?;

        if self.custom_method_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config("Custom method timeout must be non-zero"));
        }

        Ok(())
    }
}

/// Accepts `"*"` or a bare `scheme://host[:port]` origin.
fn validate_origin(origin: &str) -> Result<()> {
    if origin == ANY_ORIGIN {
        return Ok(());
    }

    let url = Url::parse(origin)
        .map_err(|e| Error::config(format!("Invalid target origin '{origin}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Target origin '{origin}' must use http or https"
        )));
    }

    if url.host_str().is_none() {
        return Err(Error::config(format!("Target origin '{origin}' has no host")));
    }

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(Error::config(format!(
            "Target origin '{origin}' must not carry a path, query or fragment"
        )));
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
