//! # forecourt-core: Pure Business Logic for Forecourt
//!
//! This crate is the **heart** of Forecourt. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Forecourt Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               HTTP handlers / dashboard (external)              │   │
//! │  │    auth ──► role gate ──► tenant router ──► RequestContext      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              forecourt-db (services + storage)                  │   │
//! │  │    SaleService, ReconciliationService, repositories             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ forecourt-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │  volume   │  │  tender   │   │   │
//! │  │   │  Nozzle   │  │   Money   │  │  Volume   │  │  split    │   │   │
//! │  │   │   Sale    │  │  (paise)  │  │   (cl)    │  │  rules    │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Nozzle, Sale, Creditor, DayReconciliation, …)
//! - [`money`] - Money type with integer paise arithmetic (no floating point!)
//! - [`volume`] - Volume type with integer centilitre arithmetic
//! - [`tender`] - Payment-split and day-close balance rules
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Fixed-Point**: Money in paise, volume in centilitres, both i64
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use forecourt_core::money::Money;
//! use forecourt_core::volume::Volume;
//!
//! // 45.50 L dispensed at ₹3.20 per litre
//! let dispensed = Volume::from_centilitres(4550);
//! let rate = Money::from_paise(320);
//!
//! // Rounded to whole paise at the multiplication, never later
//! let amount = dispensed.amount_at(rate);
//! assert_eq!(amount.paise(), 14560); // ₹145.60
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod tender;
pub mod types;
pub mod validation;
pub mod volume;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use forecourt_core::Money` instead of
// `use forecourt_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;
pub use volume::Volume;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tolerance, in paise, for every money-balancing check in the system: the
/// cash/credit split against a sale's amount, and the four tender totals
/// against a day's total sales.
///
/// ## Why one paisa?
/// Amounts are rounded to the paisa at the volume × price multiplication, so
/// a till that enters the printed figures can still disagree with the ledger
/// by at most the rounding step. Anything beyond that is a data error, not
/// rounding.
pub const PAYMENT_TOLERANCE_PAISE: i64 = 1;

/// Maximum length for names (creditor party names and the like).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for free-text reasons (void reason).
pub const MAX_REASON_LEN: usize = 500;
