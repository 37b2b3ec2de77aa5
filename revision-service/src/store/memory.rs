//! In-memory versioned store
//!
//! Backend for tests and for running without an external document store.
//! Every mutating method takes the map lock once, so compare-and-swap is
//! genuinely atomic: of N concurrent writers presenting the same expected
//! version, exactly one observes a matching counter.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::model::ModelVersion;

use super::{StoreError, StoreErrorKind, StoreOperation, StoreResult, VersionedStore};

#[derive(Debug, Clone)]
struct Entry<M> {
    model: M,
    version: i64,
}

/// Mutex-guarded map of id → (model, version).
#[derive(Debug, Default)]
pub struct MemoryStore<M> {
    entries: Mutex<HashMap<String, Entry<M>>>,
}

impl<M: Clone + Send + Sync> MemoryStore<M> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Insert an entry with an explicit version counter.
    ///
    /// Fabricates store states for tests without going through the write
    /// path, e.g. to stage a specific counter for a staleness scenario.
    pub fn seed(&self, id: impl Into<String>, model: M, version: i64) -> StoreResult<()> {
        let mut entries = self.lock(StoreOperation::Create)?;
        entries.insert(id.into(), Entry { model, version });
        Ok(())
    }

    /// The stored counter for `id`, if present. Assertion helper.
    pub fn current_version(&self, id: &str) -> StoreResult<Option<i64>> {
        let entries = self.lock(StoreOperation::Load)?;
        Ok(entries.get(id).map(|entry| entry.version))
    }

    fn lock(&self, operation: StoreOperation) -> StoreResult<MutexGuard<'_, HashMap<String, Entry<M>>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::new(operation, StoreErrorKind::Backend, "store mutex poisoned"))
    }
}

impl<M: Clone + Send + Sync> VersionedStore<M> for MemoryStore<M> {
    async fn load(&self, id: &str) -> StoreResult<Option<ModelVersion<M>>> {
        let entries = self.lock(StoreOperation::Load)?;
        Ok(entries
            .get(id)
            .map(|entry| ModelVersion::new(entry.model.clone(), entry.version)))
    }

    async fn create(
        &self,
        id: &str,
        model: M,
        _expected: Option<i64>,
    ) -> StoreResult<ModelVersion<M>> {
        let mut entries = self.lock(StoreOperation::Create)?;
        if entries.contains_key(id) {
            return Err(StoreError::already_exists(id));
        }
        entries.insert(id.to_string(), Entry { model: model.clone(), version: 1 });
        Ok(ModelVersion::new(model, 1))
    }

    async fn compare_and_swap(
        &self,
        id: &str,
        model: M,
        expected: Option<i64>,
    ) -> StoreResult<ModelVersion<M>> {
        let mut entries = self.lock(StoreOperation::CompareAndSwap)?;
        let next = match (entries.get(id), expected) {
            // Unconditional: create or overwrite
            (None, None) => 1,
            (Some(entry), None) => entry.version + 1,
            (Some(entry), Some(version)) if entry.version == version => entry.version + 1,
            (Some(entry), Some(version)) => {
                return Err(StoreError::optimistic_lock(
                    StoreOperation::CompareAndSwap,
                    id,
                    Some(version),
                    entry.version,
                ));
            }
            (None, Some(version)) => {
                return Err(StoreError::new(
                    StoreOperation::CompareAndSwap,
                    StoreErrorKind::OptimisticLockFailure,
                    format!("expected version {version}, resource absent"),
                )
                .with_id(id));
            }
        };
        entries.insert(id.to_string(), Entry { model: model.clone(), version: next });
        Ok(ModelVersion::new(model, next))
    }

    async fn delete(&self, id: &str, expected: Option<i64>) -> StoreResult<()> {
        let mut entries = self.lock(StoreOperation::Delete)?;
        let Some(entry) = entries.get(id) else {
            return Err(StoreError::not_found(StoreOperation::Delete, id));
        };
        if let Some(version) = expected {
            if entry.version != version {
                return Err(StoreError::optimistic_lock(
                    StoreOperation::Delete,
                    id,
                    Some(version),
                    entry.version,
                ));
            }
        }
        entries.remove(id);
        Ok(())
    }
}
