//! Versioned store contract
//!
//! The store is the sole authority on concurrency control: every write is an
//! atomic compare-and-swap against the stored version counter, and exactly
//! one of N concurrent writers presenting the same expected version may
//! succeed. Counters are assigned by the store on the first successful write
//! and strictly incremented on each subsequent one.
//!
//! Any `load` the caller performs before a write is advisory only: a fast,
//! non-authoritative early rejection for preconditions. Correctness never
//! depends on a load-then-act sequence.
//!
//! The trait uses RPITIT (Return Position Impl Trait In Traits) for async
//! methods without boxing, available since Rust 1.75.

use std::future::Future;

use crate::model::ModelVersion;

mod error;
pub mod memory;

pub use error::{StoreError, StoreErrorKind, StoreOperation, StoreResult};
pub use memory::MemoryStore;

/// Atomic load/create/save/delete of (model, version) pairs.
///
/// # Type Parameters
///
/// - `M`: the model type held at each identifier
pub trait VersionedStore<M>: Send + Sync {
    /// Load the current (model, version) pair, `None` if absent.
    fn load(&self, id: &str) -> impl Future<Output = StoreResult<Option<ModelVersion<M>>>> + Send;

    /// Create a new resource at `id`.
    ///
    /// Fails with [`StoreErrorKind::AlreadyExists`] when a resource already
    /// exists at the identifier. Identifiers are normally server-generated,
    /// so duplicates should be rare. `expected` is advisory and carried for
    /// store backends that validate it; the first successful write always
    /// produces version 1.
    fn create(
        &self,
        id: &str,
        model: M,
        expected: Option<i64>,
    ) -> impl Future<Output = StoreResult<ModelVersion<M>>> + Send;

    /// Atomically write `model` at `id` if the stored counter equals
    /// `expected`.
    ///
    /// `expected = None` is unconditional: create the resource or overwrite
    /// whatever is there. A stale `expected` fails with
    /// [`StoreErrorKind::OptimisticLockFailure`]; success strictly
    /// increments the stored counter and returns the new pair.
    fn compare_and_swap(
        &self,
        id: &str,
        model: M,
        expected: Option<i64>,
    ) -> impl Future<Output = StoreResult<ModelVersion<M>>> + Send;

    /// Delete the resource at `id`, conditionally when `expected` is given.
    ///
    /// Fails with [`StoreErrorKind::NotFound`] when absent and
    /// [`StoreErrorKind::OptimisticLockFailure`] when `expected` is stale.
    fn delete(&self, id: &str, expected: Option<i64>)
        -> impl Future<Output = StoreResult<()>> + Send;
}
