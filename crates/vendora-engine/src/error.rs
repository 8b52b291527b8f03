//! # Engine Errors
//!
//! What the order-processing pipeline sees when a settlement operation fails.
//!
//! Lower-layer errors pass through with their context intact; the engine adds
//! only the failure modes it owns (unknown payout ids, lost claim races).

use thiserror::Error;

use crate::catalog::CatalogError;
use vendora_core::{CoreError, ValidationError};
use vendora_db::DbError;

/// Errors surfaced by the settlement engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule violation from the core layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Ledger storage failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Catalog resolution failure (the whole batch, not a single unknown
    /// product - those are skipped, not errored).
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A lifecycle operation referenced a payout that does not exist.
    #[error("payout {payout_id} not found")]
    PayoutNotFound { payout_id: String },

    /// A concurrent batch run claimed one of this seller's records between
    /// our read and our claim. The payout was rolled back; the next run
    /// picks the seller up again.
    #[error("payout batch for seller {seller_id} lost a claim race and was rolled back")]
    ClaimContention { seller_id: String },
}

impl EngineError {
    /// Whether the caller should retry the whole operation.
    ///
    /// Split is idempotent per order and the batch is idempotent per run, so
    /// transient storage, catalog outages, and lost claim races are all safe
    /// to retry from the top. A duplicate-key error also qualifies: the retry
    /// hits the idempotency short-circuit and returns the existing rows.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Db(e) => e.is_retryable() || matches!(e, DbError::DuplicateKey { .. }),
            EngineError::Catalog(_) => true,
            EngineError::ClaimContention { .. } => true,
            _ => false,
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(e: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(e))
    }
}

/// Transaction begin/commit/rollback surface raw driver errors; classify
/// them the same way repository calls are classified.
impl From<sqlx::Error> for EngineError {
    fn from(e: sqlx::Error) -> Self {
        EngineError::Db(DbError::from(e))
    }
}

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
