//! # Validation Module
//!
//! Input validation utilities for Forecourt.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (external)                                         │
//! │  ├── Body parsing, decimal → subunit conversion                         │
//! │  └── Auth, role gating, tenant resolution                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + tender rules                                    │
//! │  ├── Field checks before any transaction is opened                      │
//! │  └── Business invariants (split sum, monotonic meter)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE (station, business_date) on reconciliations                 │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::volume::Volume;
use crate::{MAX_NAME_LEN, MAX_REASON_LEN};

// =============================================================================
// String Validators
// =============================================================================

/// Validates a creditor's party name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use forecourt_core::validation::validate_party_name;
///
/// assert!(validate_party_name("Sharma Transport").is_ok());
/// assert!(validate_party_name("   ").is_err());
/// ```
pub fn validate_party_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "party_name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "party_name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a void reason.
///
/// A void rewrites the day's money; "why" is not optional.
pub fn validate_void_reason(reason: &str) -> ValidationResult<()> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "void_reason".to_string(),
        });
    }

    if reason.len() > MAX_REASON_LEN {
        return Err(ValidationError::TooLong {
            field: "void_reason".to_string(),
            max: MAX_REASON_LEN,
        });
    }

    Ok(())
}

/// Validates a station identifier.
///
/// Station ids are opaque references owned by the (external) station
/// registry, so only emptiness is checked here.
pub fn validate_station_id(station_id: &str) -> ValidationResult<()> {
    if station_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "station_id".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a creditor payment amount.
///
/// ## Rules
/// - Must be positive (> 0); zero or negative receipts are meaningless
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a manually-entered day-close tender total (card or UPI).
pub fn validate_tender_total(field: &'static str, total: Money) -> ValidationResult<()> {
    if total.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a nozzle's registration reading.
///
/// Totalizers start at zero or wherever the previous owner left them;
/// negative makes no physical sense.
pub fn validate_initial_reading(reading: Volume) -> ValidationResult<()> {
    if reading.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "initial_reading".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use forecourt_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
