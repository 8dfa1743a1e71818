//! # Database and Service Error Types
//!
//! Two layers of errors live here: [`DbError`] for storage failures and
//! [`ServiceError`] for the orchestration layer on top of it.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError (this module) ← Joins storage errors with the domain     │
//! │       │                         errors from forecourt-core             │
//! │       ▼                                                                 │
//! │  HTTP layer maps to a status code + JSON body for the till UI          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every service error is transaction-fatal: the owning `sqlx` transaction
//! is dropped un-committed, so a failed sale never leaves a half-advanced
//! meter or a half-applied creditor balance behind.

use chrono::NaiveDate;
use thiserror::Error;

use forecourt_core::{CoreError, FuelType};

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    /// - Soft-deleted record
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Second open price row for the same (station, fuel type)
    /// - Second reconciliation row for the same (station, business date)
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Sale referencing a non-existent nozzle_id or credit_party_id
    /// - Payment referencing a non-existent creditor_id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Tenant database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - CHECK constraint rejected a value
    /// - Runtime SQL error
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use past the busy timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

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
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

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

// =============================================================================
// Service Errors
// =============================================================================

/// Errors raised by the transaction scripts (sale engine, reconciliation
/// aggregator, creditor ledger).
///
/// The named variants are the orchestration failures that need database
/// state to detect; pure rule violations arrive wrapped via [`CoreError`]
/// and storage failures via [`DbError`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The nozzle does not exist, or is deactivated.
    #[error("nozzle not found or inactive: {nozzle_id}")]
    NozzleNotFound { nozzle_id: String },

    /// No price row covers the sale timestamp. The sale cannot be priced
    /// and is aborted.
    #[error("no active {fuel_type} price for station {station_id}")]
    NoActivePrice {
        station_id: String,
        fuel_type: FuelType,
    },

    /// The sale does not exist.
    #[error("sale not found: {sale_id}")]
    SaleNotFound { sale_id: String },

    /// The sale was already voided; a void happens exactly once.
    #[error("sale already voided: {sale_id}")]
    AlreadyVoided { sale_id: String },

    /// The day's reconciliation is finalized: its sales cannot be voided
    /// and its draft cannot be rewritten.
    #[error("day {business_date} at station {station_id} is finalized and locked")]
    ReconciliationLocked {
        station_id: String,
        business_date: NaiveDate,
    },

    /// Meter rollback refused: the sale is not the most recent one on its
    /// nozzle, so restoring previous_reading would corrupt later readings.
    #[error("sale {sale_id} is not the latest on nozzle {nozzle_id}; meter rollback refused")]
    OutOfOrderVoid { sale_id: String, nozzle_id: String },

    /// The creditor does not exist (or is inactive, for operations that
    /// require an active account).
    #[error("creditor not found or inactive: {creditor_id}")]
    CreditorNotFound { creditor_id: String },

    /// A domain rule from forecourt-core was violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage operation failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DbError::not_found("Nozzle", "noz-42");
        assert_eq!(err.to_string(), "Nozzle not found: noz-42");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_no_active_price_display() {
        let err = ServiceError::NoActivePrice {
            station_id: "st-1".to_string(),
            fuel_type: FuelType::Diesel,
        };
        assert_eq!(err.to_string(), "no active diesel price for station st-1");
    }

    #[test]
    fn test_core_error_wraps_transparently() {
        let core = CoreError::CreditPartyRequired;
        let service: ServiceError = core.into();
        assert_eq!(
            service.to_string(),
            "a credit party is required when credit is given"
        );
    }
}
