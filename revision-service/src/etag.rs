//! Version token codec and wire-level entity tags
//!
//! A resource's concurrency state is a signed 64-bit counter assigned by the
//! store on every successful write. Clients never see the counter directly:
//! it crosses the wire as an opaque token, produced by XOR-ing the counter
//! with a mask derived from the resource's scope key and base64url-encoding
//! the 8-byte big-endian result. Typical tokens are 11 characters.
//!
//! Binding the token to a scope means a token copied from one resource's
//! response onto another resource's request decodes to a counter that does
//! not match anything live. This is best-effort only: the mask is an unkeyed
//! hash of the scope, not a MAC, so anyone who knows the scheme can forge a
//! token for any scope. Upgrading to a keyed construction would change the
//! wire format, so the weakness is documented here instead of fixed.
//!
//! # Example
//!
//! ```rust
//! use revision_service::etag;
//!
//! let token = etag::encode(42, "/fortune/v1/abc");
//! assert_eq!(etag::decode(&token, "/fortune/v1/abc"), Some(42));
//! assert_ne!(etag::decode(&token, "/fortune/v1/xyz"), Some(42));
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Derive the 64-bit scope mask from a scope key.
fn scope_mask(scope: &str) -> u64 {
    let hash = blake3::hash(scope.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_be_bytes(bytes)
}

/// Encode a version counter as an opaque token bound to `scope`.
pub fn encode(counter: i64, scope: &str) -> String {
    let combined = (counter as u64) ^ scope_mask(scope);
    URL_SAFE_NO_PAD.encode(combined.to_be_bytes())
}

/// Recover a version counter from a token bound to `scope`.
///
/// Returns `None` for malformed input (bad base64 or wrong byte length).
/// Callers treat `None` as a value that can never match a live resource;
/// malformed tokens are not an error.
pub fn decode(token: &str, scope: &str) -> Option<i64> {
    let bytes = URL_SAFE_NO_PAD.decode(token.as_bytes()).ok()?;
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some((u64::from_be_bytes(raw) ^ scope_mask(scope)) as i64)
}

/// An entity tag supplied in an `If-Match` or `If-None-Match` header.
///
/// The wire form is either the quoted opaque token (`"q80PTJr_SNo"`) or the
/// reserved wildcard `"*"` meaning "any version". Unquoted values are
/// accepted and treated the same way; equality of tokens is the only
/// operation clients may rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTag {
    /// `"*"`: matches any existing version.
    Wildcard,
    /// An opaque token produced by [`encode`].
    Token(String),
}

impl EntityTag {
    /// Parse a raw header value into an entity tag.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(trimmed);
        if unquoted == "*" {
            EntityTag::Wildcard
        } else {
            EntityTag::Token(unquoted.to_string())
        }
    }

    /// Build a tag directly from a version counter and scope.
    pub fn from_version(counter: i64, scope: &str) -> Self {
        EntityTag::Token(encode(counter, scope))
    }

    /// The opaque token, if this is not the wildcard.
    pub fn token(&self) -> Option<&str> {
        match self {
            EntityTag::Wildcard => None,
            EntityTag::Token(token) => Some(token),
        }
    }

    /// True for the reserved `"*"` sentinel.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, EntityTag::Wildcard)
    }

    /// Render the quoted wire form used in headers.
    pub fn quoted(&self) -> String {
        match self {
            EntityTag::Wildcard => "\"*\"".to_string(),
            EntityTag::Token(token) => format!("\"{token}\""),
        }
    }
}

impl std::fmt::Display for EntityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.quoted())
    }
}
