//! # Volume Module
//!
//! Provides the `Volume` type for fuel quantities and meter readings.
//!
//! Dispenser totalizers report litres to two decimal places, so volume is
//! stored as an integer count of centilitres (1 cl = 0.01 L), mirroring how
//! [`Money`] stores paise. A nozzle's lifetime meter reading, the delta
//! between two readings, and a sale's dispensed volume are all `Volume`
//! values.
//!
//! ## The One Multiplication That Matters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  volume × price is the ONLY place money is multiplied in this system.   │
//! │                                                                         │
//! │    4550 cl × 320 paise/L ──► 1,456,000 hundredth-paise ──► ROUND NOW    │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                              14560 paise (₹145.60)                      │
//! │                                                                         │
//! │  The product is rounded back to whole paise immediately (half-up),      │
//! │  before any further arithmetic touches it. Deferring the rounding is    │
//! │  how day totals drift away from the sum of their sales.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Volume Type
// =============================================================================

/// A fuel quantity in centilitres (hundredths of a litre).
///
/// ## Design Decisions
/// - **i64 (signed)**: Reading deltas can be computed before being validated
///   positive; a signed representation keeps that arithmetic honest
/// - **Centilitres**: Two decimal places, exactly what the dispenser reports
/// - **Same shape as Money**: One mental model for all fixed-point values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Volume(i64);

impl Volume {
    /// Creates a Volume from centilitres.
    ///
    /// ## Example
    /// ```rust
    /// use forecourt_core::volume::Volume;
    ///
    /// let dispensed = Volume::from_centilitres(4550); // 45.50 L
    /// assert_eq!(dispensed.centilitres(), 4550);
    /// ```
    #[inline]
    pub const fn from_centilitres(cl: i64) -> Self {
        Volume(cl)
    }

    /// Creates a Volume from whole litres and centilitres.
    ///
    /// ## Example
    /// ```rust
    /// use forecourt_core::volume::Volume;
    ///
    /// let reading = Volume::from_litres_centilitres(1000, 0); // 1000.00 L
    /// assert_eq!(reading.centilitres(), 100_000);
    /// ```
    #[inline]
    pub const fn from_litres_centilitres(litres: i64, cl: i64) -> Self {
        if litres < 0 {
            Volume(litres * 100 - cl)
        } else {
            Volume(litres * 100 + cl)
        }
    }

    /// Returns the value in centilitres.
    #[inline]
    pub const fn centilitres(&self) -> i64 {
        self.0
    }

    /// Returns the whole-litre portion.
    #[inline]
    pub const fn litres(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centilitre portion (always 0-99).
    #[inline]
    pub const fn centilitres_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero volume.
    #[inline]
    pub const fn zero() -> Self {
        Volume(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Prices this volume at a per-litre rate, rounding to whole paise
    /// immediately (half-up).
    ///
    /// This is the sale-amount computation: the i128 intermediate holds
    /// centilitres × paise (i.e. hundredths of a paisa), and the `+ 50`
    /// before the division by 100 rounds the product back onto the paisa
    /// grid in the same step. Callers must not round again.
    ///
    /// ## Example
    /// ```rust
    /// use forecourt_core::money::Money;
    /// use forecourt_core::volume::Volume;
    ///
    /// let dispensed = Volume::from_centilitres(4550);   // 45.50 L
    /// let rate = Money::from_paise(320);                // ₹3.20 / L
    /// assert_eq!(dispensed.amount_at(rate).paise(), 14560); // ₹145.60
    /// ```
    pub fn amount_at(&self, price_per_litre: Money) -> Money {
        // cl × paise/L leaves the product in hundredths of a paisa.
        // (x + 50) / 100 rounds half-up for the non-negative volumes the
        // engine feeds in.
        let centipaise = self.0 as i128 * price_per_litre.paise() as i128;
        Money::from_paise(((centipaise + 50) / 100) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows litres to two decimals, for logs and receipts.
impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} L",
            sign,
            self.litres().abs(),
            self.centilitres_part()
        )
    }
}

/// Default volume is zero.
impl Default for Volume {
    fn default() -> Self {
        Volume::zero()
    }
}

/// Addition of two Volume values.
impl Add for Volume {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Volume(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Volume {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Volume values. `cumulative - previous` is how a
/// sale's dispensed volume is derived from meter readings.
impl Sub for Volume {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Volume(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Volume {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
