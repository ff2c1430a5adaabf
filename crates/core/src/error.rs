//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant maps to a rejected operation; nothing here is fatal to the
/// process. Callers are expected to surface these as user-facing messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation (e.g. non-positive amount). Nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested product or ledger entry does not exist.
    #[error("not found")]
    NotFound,

    /// A pick asked for more units than are on hand.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// A mutation would break an invariant (negative stock, illegal lifecycle
    /// transition). Commits that hit this run their compensation path.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An identifier was invalid (e.g. blank or unparsable).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (stale version, duplicate id).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    /// Whether retrying the same operation unchanged may succeed.
    ///
    /// Only optimistic-concurrency conflicts qualify; business-rule failures
    /// such as `InvalidState` never do.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether the caller can fix the request and try again.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound | Self::InsufficientStock { .. } | Self::InvalidId(_)
        )
    }
}
