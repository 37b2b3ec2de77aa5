//! Structured store error types
//!
//! Every store failure carries the operation being performed and a category,
//! so the state machine can map concurrency conflicts, duplicates, and
//! missing resources to distinct outcomes without string matching.
//!
//! # Example
//!
//! ```rust
//! use revision_service::store::{StoreError, StoreErrorKind, StoreOperation};
//!
//! let error = StoreError::optimistic_lock(StoreOperation::CompareAndSwap, "abc", Some(3), 4);
//! assert!(error.is_concurrency_conflict());
//! assert_eq!(error.kind, StoreErrorKind::OptimisticLockFailure);
//! ```

use std::fmt;

/// Operation being performed when the store error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Loading a (model, version) pair by id
    Load,
    /// Creating a new resource
    Create,
    /// Atomic compare-and-swap write
    CompareAndSwap,
    /// Deleting a resource
    Delete,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Create => write!(f, "create"),
            Self::CompareAndSwap => write!(f, "compare_and_swap"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Resource was not found
    NotFound,
    /// Resource already exists at the generated identifier
    AlreadyExists,
    /// The caller's expected version no longer matches the stored counter
    OptimisticLockFailure,
    /// Backend failure (connection, serialization, poisoned state)
    Backend,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::OptimisticLockFailure => write!(f, "optimistic_lock_failure"),
            Self::Backend => write!(f, "backend"),
        }
    }
}

/// Structured store error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// The operation being performed when the error occurred
    pub operation: StoreOperation,
    /// The category of error
    pub kind: StoreErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The id of the resource involved, if known
    pub id: Option<String>,
}

impl StoreError {
    /// Create a new store error
    pub fn new(
        operation: StoreOperation,
        kind: StoreErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            id: None,
        }
    }

    /// Attach the resource id involved
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Shorthand for a missing resource
    pub fn not_found(operation: StoreOperation, id: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::NotFound, "resource not found").with_id(id)
    }

    /// Shorthand for a duplicate create
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::Create,
            StoreErrorKind::AlreadyExists,
            "resource already exists",
        )
        .with_id(id)
    }

    /// Shorthand for a stale expected version
    pub fn optimistic_lock(
        operation: StoreOperation,
        id: impl Into<String>,
        expected: Option<i64>,
        actual: i64,
    ) -> Self {
        let expected = expected.map_or_else(|| "none".to_string(), |v| v.to_string());
        Self::new(
            operation,
            StoreErrorKind::OptimisticLockFailure,
            format!("expected version {expected}, stored version {actual}"),
        )
        .with_id(id)
    }

    /// True when the error is a rejected concurrent write, i.e. the caller
    /// should reload and retry with a fresh version.
    pub fn is_concurrency_conflict(&self) -> bool {
        self.kind == StoreErrorKind::OptimisticLockFailure
    }

    /// True when the resource did not exist
    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "store {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(id) = &self.id {
            write!(f, " [{id}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
