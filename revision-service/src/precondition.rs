//! Precondition evaluation for conditional requests
//!
//! Pure decision functions, no I/O. These implement the `If-Match` /
//! `If-None-Match` rules against the resource's current state:
//!
//! | supplied          | current state      | `if_match` | `if_none_match` |
//! |-------------------|--------------------|------------|-----------------|
//! | none              | any                | false      | true            |
//! | `"*"`             | absent             | false      | true            |
//! | `"*"`             | present            | true       | false           |
//! | token             | absent             | false      | true            |
//! | token (matching)  | present, versioned | true       | false           |
//! | token (stale)     | present, versioned | false      | true            |
//!
//! `if_none_match` reads as "treat as changed / serve fresh". The results of
//! these checks against a pre-loaded state are advisory only; the store's
//! atomic compare-and-swap remains the concurrency authority.

use crate::etag::{self, EntityTag};
use crate::model::ModelVersion;

/// Evaluate an `If-Match` precondition.
///
/// True only when a tag was supplied and it matches the current state: the
/// wildcard matches any existing resource, an explicit token must equal the
/// encoding of the current version under this resource's scope.
pub fn if_match<M>(
    supplied: Option<&EntityTag>,
    current: Option<&ModelVersion<M>>,
    scope: &str,
) -> bool {
    let Some(tag) = supplied else {
        return false;
    };
    match tag {
        EntityTag::Wildcard => current.is_some(),
        EntityTag::Token(token) => match current.and_then(ModelVersion::version) {
            Some(version) => etag::encode(version, scope) == *token,
            None => false,
        },
    }
}

/// Evaluate an `If-None-Match` precondition ("treat as changed").
///
/// True when no tag was supplied or the resource is absent (a cache hit is
/// impossible), or when an explicit token differs from the current version.
/// The wildcard is false against any existing resource: existence is itself
/// the match.
pub fn if_none_match<M>(
    supplied: Option<&EntityTag>,
    current: Option<&ModelVersion<M>>,
    scope: &str,
) -> bool {
    let (Some(tag), Some(state)) = (supplied, current) else {
        return true;
    };
    match tag {
        EntityTag::Wildcard => false,
        EntityTag::Token(token) => match state.version() {
            Some(version) => etag::encode(version, scope) != *token,
            None => true,
        },
    }
}

/// The negation used by GET/HEAD: respond 304 exactly when a tag was
/// supplied, the resource exists, and the tag matches.
pub fn is_not_modified<M>(
    supplied: Option<&EntityTag>,
    current: Option<&ModelVersion<M>>,
    scope: &str,
) -> bool {
    supplied.is_some() && current.is_some() && !if_none_match(supplied, current, scope)
}
