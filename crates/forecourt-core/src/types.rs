//! # Domain Types
//!
//! Core domain types used throughout Forecourt.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Nozzle      │   │      Sale       │   │    Creditor     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  pump_id        │   │  readings (cl)  │   │  party_name     │       │
//! │  │  fuel_type      │   │  amount_paise   │   │  balance_paise  │       │
//! │  │  reading (cl)   │   │  tender split   │   │  limit_paise    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   FuelPrice     │   │ DayReconcili-   │   │  CreditPayment  │       │
//! │  │  ─────────────  │   │ ation           │   │  ─────────────  │       │
//! │  │  effective_from │   │  ─────────────  │   │  amount_paise   │       │
//! │  │  effective_to   │   │  tender totals  │   │  method         │       │
//! │  │  (open = NULL)  │   │  finalized      │   │  received_by    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Raw Fields + Typed Accessors
//! Money and volume live in the structs as raw `i64` subunit counts
//! (`*_paise`, `*_cl`) so the rows map straight onto their tables; typed
//! access goes through methods (`amount()`, `current_reading()`), mirroring
//! how the values are actually used.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::volume::Volume;

// =============================================================================
// Fuel Type
// =============================================================================

/// The product dispensed by a nozzle.
///
/// Stored as lowercase text; a nozzle dispenses exactly one fuel type and a
/// sale snapshots it at posting time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    /// Regular petrol (MS).
    Petrol,
    /// High-speed diesel (HSD).
    Diesel,
    /// Premium / additive-blended petrol.
    Premium,
    /// Compressed natural gas.
    Cng,
}

impl FuelType {
    /// Lowercase name as stored in the database and shown in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Premium => "premium",
            FuelType::Cng => "cng",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// The tender channel a sale settled through.
///
/// `Cash`, `Credit` and `Mixed` are derived from the cash/credit split;
/// `Card` and `Upi` are caller-declared tags for sales settled on external
/// rails (see [`ExternalTender`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash into the till.
    Cash,
    /// Card terminal (external settlement).
    Card,
    /// UPI transfer (external settlement).
    Upi,
    /// Entirely on a creditor's account.
    Credit,
    /// Part cash, part creditor account.
    Mixed,
}

/// Tender tag for sales settled on external rails.
///
/// When present on a sale request, the cash/credit split validation is
/// bypassed: the money never touches the till or a creditor account, and
/// the day's card/UPI totals are entered manually at reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ExternalTender {
    Card,
    Upi,
}

impl From<ExternalTender> for PaymentMethod {
    fn from(tender: ExternalTender) -> Self {
        match tender {
            ExternalTender::Card => PaymentMethod::Card,
            ExternalTender::Upi => PaymentMethod::Upi,
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// ```text
/// posted ──► voided   (terminal; exactly once, never back)
///    │
///    └────► locked    (day finalized; voiding now impossible)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Posted and counted in daily totals.
    Posted,
    /// Reversed; excluded from totals, creditor impact unwound.
    Voided,
    /// Posted and frozen by a finalized day reconciliation.
    Locked,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Posted
    }
}

// =============================================================================
// Caller Identity
// =============================================================================

/// Role of the authenticated caller, as asserted by the auth layer.
///
/// Role *enforcement* happens outside this core; the role is carried here
/// for audit stamping and logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Manager,
    Attendant,
}

/// Request-scoped caller identity, threaded explicitly through every
/// operation. Never ambient, never global.
///
/// The tenant id selects which tenant database the caller is operating on;
/// resolution of tenant id → database handle is the external tenant
/// router's job.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RequestContext {
    pub tenant_id: String,
    pub user_id: String,
    pub role: Role,
}

impl RequestContext {
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        role: Role,
    ) -> Self {
        RequestContext {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            role,
        }
    }
}

// =============================================================================
// Credit Policy
// =============================================================================

/// What to do when a credit sale pushes a creditor past their limit.
///
/// Field experience says stations want the sale to go through with a warning
/// (the lorry is already fuelled); head offices want a hard stop. Both exist,
/// so it is a policy knob rather than hardcoded behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CreditPolicy {
    /// Post the sale, return an advisory, log at WARN.
    Warn,
    /// Abort the sale with `CreditLimitExceeded`.
    Reject,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        CreditPolicy::Warn
    }
}

// =============================================================================
// Fuel Price
// =============================================================================

/// A time-bounded price row for one (station, fuel type).
///
/// Prices are never edited in place: a price change closes the open row
/// (`effective_to` set) and inserts a new open one, so history is auditable
/// and an in-flight sale prices against whatever row covered its timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FuelPrice {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Station this price applies to.
    pub station_id: String,

    /// Fuel type being priced.
    pub fuel_type: FuelType,

    /// Price per litre in paise.
    pub price_per_litre_paise: i64,

    /// Start of the effectivity window (inclusive).
    #[ts(as = "String")]
    pub effective_from: DateTime<Utc>,

    /// End of the effectivity window (exclusive); None = still open.
    #[ts(as = "Option<String>")]
    pub effective_to: Option<DateTime<Utc>>,

    /// When the row was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl FuelPrice {
    /// Returns the per-litre price as Money.
    #[inline]
    pub fn price_per_litre(&self) -> Money {
        Money::from_paise(self.price_per_litre_paise)
    }

    /// Whether this row is the open (current) price.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.effective_to.is_none()
    }

    /// Whether this row covers the instant `at`.
    ///
    /// The window is half-open: `effective_from <= at < effective_to`.
    pub fn in_effect_at(&self, at: DateTime<Utc>) -> bool {
        if self.effective_from > at {
            return false;
        }
        match self.effective_to {
            None => true,
            Some(to) => to > at,
        }
    }
}

// =============================================================================
// Nozzle
// =============================================================================

/// A single dispensing outlet on a pump, tracking one fuel type's cumulative
/// lifetime meter reading.
///
/// The meter only moves through the sale engine: forward on every posted
/// sale, and backward only through a validated void-rollback of the most
/// recent sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Nozzle {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Pump this nozzle belongs to.
    pub pump_id: String,

    /// Fuel type dispensed by this nozzle.
    pub fuel_type: FuelType,

    /// Totalizer value when the nozzle was registered, in centilitres.
    pub initial_reading_cl: i64,

    /// Current totalizer value, in centilitres.
    pub current_reading_cl: i64,

    /// Whether the nozzle accepts sales (soft delete).
    pub active: bool,

    /// When the nozzle was registered.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the meter last moved.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Nozzle {
    /// Returns the registration-time reading as Volume.
    #[inline]
    pub fn initial_reading(&self) -> Volume {
        Volume::from_centilitres(self.initial_reading_cl)
    }

    /// Returns the current reading as Volume.
    #[inline]
    pub fn current_reading(&self) -> Volume {
        Volume::from_centilitres(self.current_reading_cl)
    }

    /// Litres dispensed over the nozzle's lifetime here.
    #[inline]
    pub fn lifetime_dispensed(&self) -> Volume {
        self.current_reading() - self.initial_reading()
    }

    /// Checks that `proposed` advances the meter.
    ///
    /// This is the monotonicity rule: a cumulative reading must be strictly
    /// greater than the current one. The storage layer calls this with the
    /// nozzle row locked so two concurrent sales cannot both pass against
    /// the same current reading.
    pub fn validate_advance(&self, proposed: Volume) -> CoreResult<()> {
        if proposed.centilitres() <= self.current_reading_cl {
            return Err(CoreError::NonMonotonicReading {
                nozzle_id: self.id.clone(),
                current: self.current_reading(),
                proposed,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A posted fuel sale: a priced meter delta plus its tender split.
///
/// Price and fuel type are snapshotted at posting time so later price
/// changes or nozzle edits never rewrite history. The reading pair
/// (`previous`, `cumulative`) is the audit trail tying the sale to the
/// physical totalizer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub station_id: String,
    pub nozzle_id: String,
    /// Attendant who posted the sale.
    pub user_id: String,
    /// Fuel type at time of sale (frozen).
    pub fuel_type: FuelType,
    /// Meter reading before this sale, in centilitres.
    pub previous_reading_cl: i64,
    /// Meter reading after this sale, in centilitres.
    pub cumulative_reading_cl: i64,
    /// Dispensed volume in centilitres; cumulative − previous unless an
    /// explicit volume was supplied (testing/calibration sales).
    pub sale_volume_cl: i64,
    /// Per-litre price at time of sale in paise (frozen).
    pub price_per_litre_paise: i64,
    /// Sale amount in paise: round2(volume × price).
    pub amount_paise: i64,
    /// Cash received into the till, in paise.
    pub cash_received_paise: i64,
    /// Amount put on a creditor's account, in paise.
    pub credit_given_paise: i64,
    /// Creditor carrying `credit_given`; required when it is positive.
    pub credit_party_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    /// Who voided the sale.
    pub voided_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub voided_at: Option<DateTime<Utc>>,
    pub void_reason: Option<String>,
    pub notes: Option<String>,
    /// When the sale was posted.
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
    /// Calendar day the sale belongs to for reconciliation.
    #[ts(as = "String")]
    pub business_date: NaiveDate,
}

impl Sale {
    /// Returns the reading before this sale as Volume.
    #[inline]
    pub fn previous_reading(&self) -> Volume {
        Volume::from_centilitres(self.previous_reading_cl)
    }

    /// Returns the reading after this sale as Volume.
    #[inline]
    pub fn cumulative_reading(&self) -> Volume {
        Volume::from_centilitres(self.cumulative_reading_cl)
    }

    /// Returns the dispensed volume as Volume.
    #[inline]
    pub fn sale_volume(&self) -> Volume {
        Volume::from_centilitres(self.sale_volume_cl)
    }

    /// Returns the frozen per-litre price as Money.
    #[inline]
    pub fn price_per_litre(&self) -> Money {
        Money::from_paise(self.price_per_litre_paise)
    }

    /// Returns the sale amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }

    /// Returns the cash portion as Money.
    #[inline]
    pub fn cash_received(&self) -> Money {
        Money::from_paise(self.cash_received_paise)
    }

    /// Returns the credit portion as Money.
    #[inline]
    pub fn credit_given(&self) -> Money {
        Money::from_paise(self.credit_given_paise)
    }

    /// Whether this sale still counts towards daily totals.
    #[inline]
    pub fn counts_in_totals(&self) -> bool {
        self.status != SaleStatus::Voided
    }
}

// =============================================================================
// Creditor
// =============================================================================

/// A customer account permitted to purchase on credit.
///
/// `running_balance` is what the party currently owes: the sum of
/// non-voided `credit_given` on their sales minus recorded payments.
/// Negative means the station owes them (overpayment).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Creditor {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Station this account is held at.
    pub station_id: String,

    /// Account holder (person or business).
    pub party_name: String,

    /// Contact number, if on file.
    pub phone: Option<String>,

    /// Outstanding balance in paise.
    pub running_balance_paise: i64,

    /// Soft ceiling in paise; `<= 0` means no limit is set.
    pub credit_limit_paise: i64,

    /// Whether new credit sales are accepted (soft delete).
    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Creditor {
    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn running_balance(&self) -> Money {
        Money::from_paise(self.running_balance_paise)
    }

    /// Returns the credit limit as Money.
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_paise(self.credit_limit_paise)
    }

    /// Whether a limit is configured at all.
    #[inline]
    pub fn has_limit(&self) -> bool {
        self.credit_limit_paise > 0
    }

    /// Whether the current balance sits above the configured limit.
    /// Always false when no limit is set.
    pub fn over_limit(&self) -> bool {
        self.has_limit() && self.running_balance_paise > self.credit_limit_paise
    }
}

/// Advisory returned (and logged) when a credit sale leaves a creditor over
/// their limit under the `Warn` policy.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditLimitBreach {
    pub creditor_id: String,
    pub party_name: String,
    pub running_balance_paise: i64,
    pub credit_limit_paise: i64,
}

impl CreditLimitBreach {
    /// Returns the balance as Money.
    #[inline]
    pub fn running_balance(&self) -> Money {
        Money::from_paise(self.running_balance_paise)
    }

    /// Returns the limit as Money.
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_paise(self.credit_limit_paise)
    }
}

// =============================================================================
// Credit Payment
// =============================================================================

/// A payment received against a creditor's balance, independent of any sale.
/// Append-only receipt trail.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CreditPayment {
    pub id: String,
    pub creditor_id: String,
    /// Amount received in paise (always positive).
    pub amount_paise: i64,
    /// How the payment arrived (cash/card/upi; never credit).
    pub method: PaymentMethod,
    /// External reference (UPI txn id, cheque number, etc.).
    pub reference: Option<String>,
    /// Who took the payment.
    pub received_by: String,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CreditPayment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }
}

// =============================================================================
// Day Reconciliation
// =============================================================================

/// The end-of-day record for one (station, business date).
///
/// Draft rows (finalized = false) update in place as the day is worked;
/// finalizing validates the tender-sum invariant, freezes the record, and
/// relabels the day's posted sales to `locked`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DayReconciliation {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub station_id: String,

    #[ts(as = "String")]
    pub business_date: NaiveDate,

    /// Sum of amount over non-voided sales, in paise.
    pub total_sales_paise: i64,

    /// Sum of cash_received over non-voided sales, in paise.
    pub cash_total_paise: i64,

    /// Sum of credit_given over non-voided sales, in paise.
    pub credit_total_paise: i64,

    /// Manually-entered card settlement total, in paise.
    pub card_total_paise: i64,

    /// Manually-entered UPI settlement total, in paise.
    pub upi_total_paise: i64,

    /// Draft (false) or final (true); monotonic, never reverts.
    pub finalized: bool,

    /// Who opened the day-close record.
    pub created_by: String,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl DayReconciliation {
    /// Returns total sales as Money.
    #[inline]
    pub fn total_sales(&self) -> Money {
        Money::from_paise(self.total_sales_paise)
    }

    /// Returns the cash tender total as Money.
    #[inline]
    pub fn cash_total(&self) -> Money {
        Money::from_paise(self.cash_total_paise)
    }

    /// Returns the credit tender total as Money.
    #[inline]
    pub fn credit_total(&self) -> Money {
        Money::from_paise(self.credit_total_paise)
    }

    /// Returns the card tender total as Money.
    #[inline]
    pub fn card_total(&self) -> Money {
        Money::from_paise(self.card_total_paise)
    }

    /// Returns the UPI tender total as Money.
    #[inline]
    pub fn upi_total(&self) -> Money {
        Money::from_paise(self.upi_total_paise)
    }

    /// Sum of all four tender totals.
    pub fn tender_sum(&self) -> Money {
        self.cash_total() + self.credit_total() + self.card_total() + self.upi_total()
    }
}

// =============================================================================
// Daily Totals (computed, not stored)
// =============================================================================

/// Computed tender totals for a station-day, before any reconciliation row
/// exists. What the day-close screen shows the manager.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyTotals {
    pub station_id: String,
    #[ts(as = "String")]
    pub business_date: NaiveDate,
    /// Sum of amount over non-voided sales, in paise.
    pub total_sales_paise: i64,
    /// Sum of cash_received over non-voided sales, in paise.
    pub cash_total_paise: i64,
    /// Sum of credit_given over non-voided sales, in paise.
    pub credit_total_paise: i64,
    /// Count of non-voided sales.
    pub sale_count: i64,
}

impl DailyTotals {
    /// Returns total sales as Money.
    #[inline]
    pub fn total_sales(&self) -> Money {
        Money::from_paise(self.total_sales_paise)
    }

    /// Returns the cash total as Money.
    #[inline]
    pub fn cash_total(&self) -> Money {
        Money::from_paise(self.cash_total_paise)
    }

    /// Returns the credit total as Money.
    #[inline]
    pub fn credit_total(&self) -> Money {
        Money::from_paise(self.credit_total_paise)
    }
}

// =============================================================================
// Sale Request / Result
// =============================================================================

/// Input to the sale engine, as parsed by the HTTP layer.
///
/// Readings and amounts arrive already converted to subunits; the engine
/// derives everything else (previous reading, volume, price, amount) inside
/// its transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub station_id: String,
    pub nozzle_id: String,
    /// The totalizer value read off the dispenser.
    pub cumulative_reading: Volume,
    /// Overrides the meter delta when set (testing/calibration draws).
    pub explicit_volume: Option<Volume>,
    pub cash_received: Money,
    pub credit_given: Money,
    pub credit_party_id: Option<String>,
    /// Set for card/UPI sales; bypasses the cash/credit split validation.
    pub external_tender: Option<ExternalTender>,
    pub notes: Option<String>,
}

/// A successfully posted sale, plus the credit-limit advisory when the
/// warn policy tripped.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PostedSale {
    pub sale: Sale,
    pub credit_warning: Option<CreditLimitBreach>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn price_row(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> FuelPrice {
        FuelPrice {
            id: "p-1".to_string(),
            station_id: "st-1".to_string(),
            fuel_type: FuelType::Petrol,
            price_per_litre_paise: 9477,
            effective_from: from,
            effective_to: to,
            created_at: Utc::now(),
        }
    }

    fn nozzle_at(current_cl: i64) -> Nozzle {
        Nozzle {
            id: "noz-1".to_string(),
            pump_id: "pump-1".to_string(),
            fuel_type: FuelType::Diesel,
            initial_reading_cl: 50_000,
            current_reading_cl: current_cl,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_price_window_half_open() {
        let from = "2025-03-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let to = "2025-03-10T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let closed = price_row(from, Some(to));

        assert!(closed.in_effect_at(from)); // inclusive start
        assert!(closed.in_effect_at("2025-03-05T12:00:00Z".parse().unwrap()));
        assert!(!closed.in_effect_at(to)); // exclusive end
        assert!(!closed.in_effect_at("2025-02-28T23:59:59Z".parse().unwrap()));

        let open = price_row(from, None);
        assert!(open.is_open());
        assert!(open.in_effect_at("2030-01-01T00:00:00Z".parse().unwrap()));
    }

    #[test]
    fn test_nozzle_advance_monotonic() {
        let nozzle = nozzle_at(104_550);

        assert!(nozzle.validate_advance(Volume::from_centilitres(104_551)).is_ok());

        // Equal reading means zero dispensed; that is not an advance.
        let equal = nozzle.validate_advance(Volume::from_centilitres(104_550));
        assert!(matches!(equal, Err(CoreError::NonMonotonicReading { .. })));

        let backwards = nozzle.validate_advance(Volume::from_centilitres(100_455));
        assert!(matches!(backwards, Err(CoreError::NonMonotonicReading { .. })));
    }

    #[test]
    fn test_nozzle_lifetime_dispensed() {
        let nozzle = nozzle_at(104_550);
        assert_eq!(nozzle.lifetime_dispensed().centilitres(), 54_550);
    }

    #[test]
    fn test_creditor_limit_semantics() {
        let mut creditor = Creditor {
            id: "cr-1".to_string(),
            station_id: "st-1".to_string(),
            party_name: "Sharma Transport".to_string(),
            phone: None,
            running_balance_paise: 500_000,
            credit_limit_paise: 400_000,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(creditor.has_limit());
        assert!(creditor.over_limit());

        creditor.running_balance_paise = 400_000;
        assert!(!creditor.over_limit()); // at the limit is not over it

        // Zero limit = no limit configured; any balance is fine.
        creditor.credit_limit_paise = 0;
        creditor.running_balance_paise = 9_900_000;
        assert!(!creditor.has_limit());
        assert!(!creditor.over_limit());
    }

    #[test]
    fn test_reconciliation_tender_sum() {
        let recon = DayReconciliation {
            id: "dr-1".to_string(),
            station_id: "st-1".to_string(),
            business_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            total_sales_paise: 14560,
            cash_total_paise: 10000,
            credit_total_paise: 4560,
            card_total_paise: 0,
            upi_total_paise: 0,
            finalized: true,
            created_by: "mgr-1".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(recon.tender_sum().paise(), 14560);
        assert_eq!(recon.tender_sum(), recon.total_sales());
    }

    #[test]
    fn test_external_tender_maps_to_payment_method() {
        assert_eq!(PaymentMethod::from(ExternalTender::Card), PaymentMethod::Card);
        assert_eq!(PaymentMethod::from(ExternalTender::Upi), PaymentMethod::Upi);
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Posted);
    }
}
