//! Type-safe identifiers.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`RequestId`] | Correlation id tying a custom method call to its reply |
//! | [`ListenerId`] | Identity of one listener registration |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Alphabet correlation ids are drawn from.
pub const REQUEST_ID_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated correlation id.
pub const REQUEST_ID_LENGTH: usize = 16;

// ============================================================================
// RequestId
// ============================================================================

/// Correlation id for a custom method call.
///
/// Serialized as a bare string (`req_id` on the wire). Ids generated by the
/// bridge are [`REQUEST_ID_LENGTH`] characters drawn from
/// [`REQUEST_ID_ALPHABET`]; ids received from the host are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Draws a fresh random id from the given generator.
    #[must_use]
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..REQUEST_ID_LENGTH)
            .map(|_| {
                let index = rng.gen_range(0..REQUEST_ID_ALPHABET.len());
                char::from(REQUEST_ID_ALPHABET[index])
            })
            .collect();
        Self(id)
    }

    /// Draws a fresh random id from the thread-local generator.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ListenerId
// ============================================================================

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a single listener registration.
///
/// Two registrations of the same closure get different ids, so removal is
/// by registration rather than by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocates the next process-wide unique id.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_request_id_shape() {
        let id = RequestId::generate();
        assert_eq!(id.as_str().len(), REQUEST_ID_LENGTH);
        assert!(id.as_str().bytes().all(|b| REQUEST_ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_request_id_alphabet_is_alphanumeric() {
        assert_eq!(REQUEST_ID_ALPHABET.len(), 62);
        assert!(REQUEST_ID_ALPHABET.iter().all(u8::is_ascii_alphanumeric));
    }

    #[test]
    fn test_request_id_seeded_is_deterministic() {
        let a = RequestId::generate_with(&mut StdRng::seed_from_u64(7));
        let b = RequestId::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_request_id_serializes_as_string() {
        let id = RequestId::from("abc123");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"abc123\"");

        let parsed: RequestId = serde_json::from_str("\"xyz\"").expect("parse");
        assert_eq!(parsed.as_str(), "xyz");
    }

    #[test]
    fn test_listener_ids_are_unique() {
        let a = ListenerId::next();
        let b = ListenerId::next();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
    }
}
