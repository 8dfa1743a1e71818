//! # Error Types
//!
//! Domain-specific error types for forecourt-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  forecourt-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations (pure, no I/O)        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  forecourt-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── ServiceError     - Orchestration failures (wraps both)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → HTTP layer          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (nozzle id, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Amount errors carry expected vs actual so the till UI can re-prompt

use thiserror::Error;

use crate::money::Money;
use crate::volume::Volume;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// Every variant here is decidable from values already in hand; nothing in
/// this enum requires a database to detect. The storage layer raises its own
/// errors for missing rows and lock conflicts.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A meter reading that does not advance the nozzle.
    ///
    /// ## When This Occurs
    /// - Attendant typo (1045.50 entered as 1004.55)
    /// - Reading taken from the wrong nozzle on a multi-nozzle pump
    /// - A concurrent sale already advanced the meter past this reading
    ///
    /// ## Workflow
    /// ```text
    /// createSale(cumulative = 1004.55)
    ///      │
    ///      ▼
    /// nozzle.current_reading = 1045.50
    ///      │
    ///      ▼
    /// NonMonotonicReading { current: 1045.50, proposed: 1004.55 }
    ///      │
    ///      ▼
    /// UI shows: "Meter is already at 1045.50 L"
    /// ```
    #[error("meter cannot move backwards on nozzle {nozzle_id}: current {current}, proposed {proposed}")]
    NonMonotonicReading {
        nozzle_id: String,
        current: Volume,
        proposed: Volume,
    },

    /// Sale volume computed (or supplied) as zero or negative.
    #[error("sale volume must be positive, got {volume}")]
    NonPositiveVolume { volume: Volume },

    /// Cash + credit does not cover the computed sale amount within the
    /// one-paisa tolerance. Carries both sides for client correction.
    #[error("payment split does not match sale amount {amount}: cash {cash_received} + credit {credit_given} differs by {difference}")]
    PaymentMismatch {
        amount: Money,
        cash_received: Money,
        credit_given: Money,
        difference: Money,
    },

    /// credit_given is positive but no creditor was named.
    #[error("a credit party is required when credit is given")]
    CreditPartyRequired,

    /// Card/UPI sales settle on external rails; they must not also carry
    /// cash or credit amounts.
    #[error("card/upi sales must not carry cash or credit amounts")]
    ExternalTenderSplit,

    /// A credit sale pushed the creditor past their limit and the ledger is
    /// configured to reject rather than warn.
    #[error("credit limit exceeded for {creditor_id}: balance {running_balance} over limit {credit_limit}")]
    CreditLimitExceeded {
        creditor_id: String,
        running_balance: Money,
        credit_limit: Money,
    },

    /// Day-close tender totals do not sum to total sales within tolerance.
    #[error("day does not reconcile: tenders sum to {tender_sum} against total sales {total_sales} (difference {difference})")]
    ReconciliationOutOfBalance {
        total_sales: Money,
        tender_sum: Money,
        difference: Money,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Builds a [`CoreError::PaymentMismatch`] with the difference computed.
    pub fn payment_mismatch(amount: Money, cash_received: Money, credit_given: Money) -> Self {
        CoreError::PaymentMismatch {
            amount,
            cash_received,
            credit_given,
            difference: (cash_received + credit_given - amount).abs(),
        }
    }

    /// Builds a [`CoreError::ReconciliationOutOfBalance`] with the
    /// difference computed.
    pub fn out_of_balance(total_sales: Money, tender_sum: Money) -> Self {
        CoreError::ReconciliationOutOfBalance {
            total_sales,
            tender_sum,
            difference: (tender_sum - total_sales).abs(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
