//! # Database Error Types
//!
//! Error types for ledger database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classified by the driver's error KIND         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError (vendora-engine) ← Adds retryability for the pipeline     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Classification switches on `sqlx`'s structured `ErrorKind` (unique
//! violation, foreign key violation, ...) - never on message substrings.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Second split writing a (order_id, seller_id) pair that exists
    /// - Any UNIQUE index violation
    #[error("Duplicate key on {entity}: {message}")]
    DuplicateKey { entity: String, message: String },

    /// Foreign key or other relational constraint violation.
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Transient I/O failure (pool exhausted, connection dropped).
    /// Safe to retry the whole operation.
    #[error("Transient database I/O failure: {0}")]
    TransientIo(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored data could not be decoded (e.g. malformed JSON rate map).
    #[error("Corrupt stored data in {entity}: {message}")]
    CorruptData { entity: String, message: String },

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether retrying the failed operation as a whole is reasonable.
    ///
    /// Constraint violations and missing rows are deterministic; only
    /// infrastructure-level failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DbError::TransientIo(_) | DbError::ConnectionFailed(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound            → DbError::NotFound
/// sqlx::Error::Database + kind()      → DuplicateKey / ConstraintViolation
/// sqlx::Error::PoolTimedOut / Closed  → TransientIo
/// Other                               → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => DbError::DuplicateKey {
                        entity: "row".to_string(),
                        message,
                    },
                    sqlx::error::ErrorKind::ForeignKeyViolation
                    | sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation => {
                        DbError::ConstraintViolation { message }
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::TransientIo("connection pool exhausted".to_string())
            }

            sqlx::Error::PoolClosed => DbError::TransientIo("pool is closed".to_string()),

            sqlx::Error::Io(io_err) => DbError::TransientIo(io_err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
