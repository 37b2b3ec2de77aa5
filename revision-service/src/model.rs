//! Versioned model pair and tagged operation outcomes

use serde::{Deserialize, Serialize};

/// An immutable (model, version) pair as produced by every store read and
/// write.
///
/// The version is the store-assigned concurrency counter; it is absent for a
/// model that has never been written. The core never mutates a version in
/// place; counters are assigned and incremented only by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersion<M> {
    model: M,
    version: Option<i64>,
}

impl<M> ModelVersion<M> {
    /// Pair a model with a store-assigned version.
    pub fn new(model: M, version: i64) -> Self {
        Self {
            model,
            version: Some(version),
        }
    }

    /// A brand-new model with no version yet (never written).
    pub fn unversioned(model: M) -> Self {
        Self {
            model,
            version: None,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn version(&self) -> Option<i64> {
        self.version
    }

    pub fn into_model(self) -> M {
        self.model
    }
}

/// Tagged result of a verb handled by the concurrency state machine.
///
/// Outcomes are transport-independent; the boundary layer renders them as
/// status codes (see [`crate::http`]). Nothing here is retried automatically:
/// a precondition failure is reported to the caller for an explicit reload
/// and retry decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<M> {
    /// The operation succeeded and produced a versioned model.
    ///
    /// `created` distinguishes create from update; `id` carries the
    /// server-generated identifier for create-by-POST, for `Location`
    /// rendering.
    Ok {
        value: ModelVersion<M>,
        created: bool,
        id: Option<String>,
    },
    /// A delete succeeded (or the resource was already gone); no body.
    Deleted,
    /// The supplied `If-None-Match` token still matches; serve nothing.
    NotModified,
    /// The resource does not exist. `gone` selects the permanent variant
    /// (410) over the transient one (404), a per-resource-type policy.
    NotFound { gone: bool },
    /// An `If-Match` mismatch or an optimistic-lock rejection by the store.
    PreconditionFailed,
    /// A create collided with an existing resource.
    Conflict,
    /// The verb is intentionally unimplemented for this resource type.
    UnsupportedOperation,
    /// The store violated its contract (e.g. a successful write returned an
    /// unversioned model).
    InternalFault(String),
}

impl<M> Outcome<M> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok { .. } | Outcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unversioned_model_has_no_version() {
        let mv = ModelVersion::unversioned("draft");
        assert_eq!(mv.version(), None);
        assert_eq!(*mv.model(), "draft");
    }

    #[test]
    fn versioned_model_keeps_counter() {
        let mv = ModelVersion::new("saved", 3);
        assert_eq!(mv.version(), Some(3));
        assert_eq!(mv.into_model(), "saved");
    }

    #[test]
    fn outcome_ok_predicate() {
        let ok: Outcome<&str> = Outcome::Ok {
            value: ModelVersion::new("x", 1),
            created: true,
            id: None,
        };
        assert!(ok.is_ok());
        assert!(Outcome::<&str>::Deleted.is_ok());
        assert!(!Outcome::<&str>::PreconditionFailed.is_ok());
    }
}
