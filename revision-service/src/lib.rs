//! # revision-service
//!
//! Conditional-request and optimistic-concurrency core for versioned REST
//! resources: the translation between store-assigned version counters and
//! opaque wire tokens (`ETag`), the `If-Match` / `If-None-Match` evaluation
//! rules, and the per-verb state machine that turns a (verb, precondition,
//! store result) triple into a tagged outcome.
//!
//! ## Shape
//!
//! - [`etag`] - counter ⇄ token codec, scoped per resource; wire-level tags
//! - [`precondition`] - pure `If-Match` / `If-None-Match` decisions
//! - [`store`] - the [`store::VersionedStore`] contract (the concurrency
//!   authority) and an atomic in-memory backend
//! - [`handler`] - the verb state machine producing [`model::Outcome`]
//! - [`policy`] - per-resource-type choices (scope, 404 vs 410, method set)
//! - [`http`] - boundary glue: header parsing and outcome to response
//!
//! The core performs no blocking waits and holds no in-process locks; all
//! serialization of concurrent writers happens inside the store's atomic
//! compare-and-swap. Outcomes are returned, never thrown, so the whole core
//! is testable without a transport.
//!
//! ## Example
//!
//! ```rust
//! use revision_service::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let handler = ResourceHandler::new(
//!     MemoryStore::new(),
//!     ResourcePolicy::new("/fortune/v1"),
//! );
//!
//! let outcome = handler.put("abc", "a saying".to_string(), None).await;
//! assert!(matches!(outcome, Outcome::Ok { created: true, .. }));
//! # }
//! ```

pub mod etag;
pub mod handler;
pub mod http;
pub mod model;
pub mod policy;
pub mod precondition;
pub mod store;

/// Commonly used types
pub mod prelude {
    pub use crate::etag::EntityTag;
    pub use crate::handler::ResourceHandler;
    pub use crate::model::{ModelVersion, Outcome};
    pub use crate::policy::ResourcePolicy;
    pub use crate::store::{MemoryStore, StoreError, StoreErrorKind, StoreResult, VersionedStore};
}
