//! Builder pattern for bridge configuration.
//!
//! # Example
//!
//! ```ignore
//! use mini_app_bridge::Bridge;
//!
//! let bridge = Bridge::builder()
//!     .debug(true)
//!     .trusted_target_origin("https://web.telegram.org")
//!     .build(host)?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::Result;
use crate::host::HostEnvironment;

use super::core::Bridge;
use super::options::BridgeOptions;

// ============================================================================
// BridgeBuilder
// ============================================================================

/// Builder for configuring a [`Bridge`].
///
/// Use [`Bridge::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct BridgeBuilder {
    options: BridgeOptions,
}

// ============================================================================
// BridgeBuilder Implementation
// ============================================================================

impl BridgeBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables debug tracing of every send and dispatch.
    #[inline]
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.options.debug = enabled;
        self
    }

    /// Sets the target origin used with the parent frame transport.
    ///
    /// # Arguments
    ///
    /// * `origin` - `"*"` or an origin such as `"https://web.telegram.org"`
    #[inline]
    #[must_use]
    pub fn trusted_target_origin(mut self, origin: impl Into<String>) -> Self {
        self.options.trusted_target_origin = origin.into();
        self
    }

    /// Sets a default timeout for every custom method call.
    #[inline]
    #[must_use]
    pub fn custom_method_timeout(mut self, timeout: Duration) -> Self {
        self.options.custom_method_timeout = Some(timeout);
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the options, detects the transport and installs receivers.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) if the target origin or
    ///   timeout is invalid
    /// - [`Error::TransportUnavailable`](crate::Error::TransportUnavailable)
    ///   if the host exposes no transport
    pub fn build(self, host: impl HostEnvironment) -> Result<Bridge> {
        Bridge::with_options(host, self.options)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;
    use crate::host::MemoryHost;

    #[test]
    fn test_builder_defaults() {
        let bridge = Bridge::builder().build(MemoryHost::webview()).expect("bridge");
        assert_eq!(bridge.options(), &BridgeOptions::default());
    }

    #[test]
    fn test_builder_sets_options() {
        let bridge = Bridge::builder()
            .debug(true)
            .trusted_target_origin("https://web.telegram.org")
            .custom_method_timeout(Duration::from_secs(3))
            .build(MemoryHost::nested_frame())
            .expect("bridge");

        assert!(bridge.options().debug);
        assert_eq!(bridge.options().trusted_target_origin, "https://web.telegram.org");
        assert_eq!(bridge.options().custom_method_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_invalid_origin_fails_before_detection() {
        let err = Bridge::builder()
            .trusted_target_origin("telegram")
            .build(MemoryHost::top_level())
            .expect_err("invalid origin");

        assert!(matches!(err, Error::Config { .. }));
        assert!(err.is_fatal());
    }
}
