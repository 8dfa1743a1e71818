//! # Tender Module
//!
//! Pure rules for how a sale's money is split across tender channels, and
//! for the day-close balance check that closes the loop.
//!
//! ## The Split Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount = round2(volume × price)          (computed by the engine)      │
//! │                                                                         │
//! │  cash_received + credit_given  must equal  amount  (± one paisa)        │
//! │                                                                         │
//! │    cash > 0, credit > 0   →  mixed                                      │
//! │    credit > 0 only        →  credit   (creditor required)               │
//! │    otherwise              →  cash                                       │
//! │                                                                         │
//! │  card / upi: declared by the caller, settle on external rails,          │
//! │  carry NO cash/credit amounts, and skip the split check entirely.       │
//! │  They reconcile through the manually-entered day totals instead.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! At day close the same tolerance applies once more:
//! `cash + credit + card + upi = total_sales` (± one paisa).

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::PaymentMethod;
use crate::PAYMENT_TOLERANCE_PAISE;

// =============================================================================
// Payment Method Derivation
// =============================================================================

/// Derives the tender channel from a validated cash/credit split.
///
/// Card/UPI never reach this function; the engine maps an
/// [`ExternalTender`](crate::types::ExternalTender) tag directly.
///
/// ## Example
/// ```rust
/// use forecourt_core::money::Money;
/// use forecourt_core::tender::derive_payment_method;
/// use forecourt_core::types::PaymentMethod;
///
/// let mixed = derive_payment_method(Money::from_paise(10000), Money::from_paise(4560));
/// assert_eq!(mixed, PaymentMethod::Mixed);
/// ```
pub fn derive_payment_method(cash_received: Money, credit_given: Money) -> PaymentMethod {
    match (cash_received.is_positive(), credit_given.is_positive()) {
        (true, true) => PaymentMethod::Mixed,
        (false, true) => PaymentMethod::Credit,
        _ => PaymentMethod::Cash,
    }
}

// =============================================================================
// Split Validation
// =============================================================================

/// Validates a cash/credit split against the computed sale amount.
///
/// ## Rules
/// - Neither portion may be negative
/// - |cash + credit − amount| ≤ one paisa, else
///   [`CoreError::PaymentMismatch`] carrying both sides for the till UI
/// - credit > 0 requires a credit party
pub fn validate_payment_split(
    amount: Money,
    cash_received: Money,
    credit_given: Money,
    credit_party_id: Option<&str>,
) -> CoreResult<()> {
    if cash_received.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "cash_received".to_string(),
        }
        .into());
    }
    if credit_given.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "credit_given".to_string(),
        }
        .into());
    }

    let difference = (cash_received + credit_given - amount).abs();
    if difference.paise() > PAYMENT_TOLERANCE_PAISE {
        return Err(CoreError::payment_mismatch(
            amount,
            cash_received,
            credit_given,
        ));
    }

    if credit_given.is_positive() && credit_party_id.map_or(true, |id| id.trim().is_empty()) {
        return Err(CoreError::CreditPartyRequired);
    }

    Ok(())
}

/// Validates a card/UPI sale's amounts.
///
/// External tenders settle off-site: a request that also carries cash or
/// credit would double-count money the till never saw.
pub fn validate_external_tender(cash_received: Money, credit_given: Money) -> CoreResult<()> {
    if !cash_received.is_zero() || !credit_given.is_zero() {
        return Err(CoreError::ExternalTenderSplit);
    }
    Ok(())
}

// =============================================================================
// Day-Close Balance
// =============================================================================

/// Validates that the four tender totals reconcile to total sales.
///
/// cash/credit come from the computed sums over non-voided sales; card/upi
/// are the manually-entered settlement figures. The whole day balances to
/// within one paisa or the finalize is refused.
pub fn validate_day_close(
    total_sales: Money,
    cash_total: Money,
    credit_total: Money,
    card_total: Money,
    upi_total: Money,
) -> CoreResult<()> {
    let tender_sum = cash_total + credit_total + card_total + upi_total;
    let difference = (tender_sum - total_sales).abs();
    if difference.paise() > PAYMENT_TOLERANCE_PAISE {
        return Err(CoreError::out_of_balance(total_sales, tender_sum));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_method_trichotomy() {
        let zero = Money::zero();
        let cash = Money::from_paise(10000);
        let credit = Money::from_paise(4560);

        assert_eq!(derive_payment_method(cash, credit), PaymentMethod::Mixed);
        assert_eq!(derive_payment_method(zero, credit), PaymentMethod::Credit);
        assert_eq!(derive_payment_method(cash, zero), PaymentMethod::Cash);
        // A zero-zero split against a zero amount is still a cash sale.
        assert_eq!(derive_payment_method(zero, zero), PaymentMethod::Cash);
    }

    #[test]
    fn test_split_exact_sum_accepted() {
        // ₹100.00 cash + ₹45.60 credit against ₹145.60
        let result = validate_payment_split(
            Money::from_paise(14560),
            Money::from_paise(10000),
            Money::from_paise(4560),
            Some("cr-1"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_split_mismatch_rejected_with_payload() {
        // ₹100.00 + ₹40.00 against ₹145.60: short by ₹5.60
        let result = validate_payment_split(
            Money::from_paise(14560),
            Money::from_paise(10000),
            Money::from_paise(4000),
            Some("cr-1"),
        );
        match result {
            Err(CoreError::PaymentMismatch {
                amount,
                cash_received,
                credit_given,
                difference,
            }) => {
                assert_eq!(amount.paise(), 14560);
                assert_eq!(cash_received.paise(), 10000);
                assert_eq!(credit_given.paise(), 4000);
                assert_eq!(difference.paise(), 560);
            }
            other => panic!("expected PaymentMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_split_tolerance_is_one_paisa() {
        let amount = Money::from_paise(14560);

        // One paisa short: accepted.
        assert!(validate_payment_split(amount, Money::from_paise(14559), Money::zero(), None).is_ok());
        // One paisa over: accepted.
        assert!(validate_payment_split(amount, Money::from_paise(14561), Money::zero(), None).is_ok());
        // Two paise short: rejected.
        assert!(validate_payment_split(amount, Money::from_paise(14558), Money::zero(), None).is_err());
    }

    #[test]
    fn test_credit_requires_party() {
        let amount = Money::from_paise(4560);
        let credit = Money::from_paise(4560);

        let missing = validate_payment_split(amount, Money::zero(), credit, None);
        assert!(matches!(missing, Err(CoreError::CreditPartyRequired)));

        let blank = validate_payment_split(amount, Money::zero(), credit, Some("  "));
        assert!(matches!(blank, Err(CoreError::CreditPartyRequired)));

        assert!(validate_payment_split(amount, Money::zero(), credit, Some("cr-1")).is_ok());
    }

    #[test]
    fn test_negative_portions_rejected() {
        let amount = Money::from_paise(1000);
        let result = validate_payment_split(
            amount,
            Money::from_paise(2000),
            Money::from_paise(-1000),
            Some("cr-1"),
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_external_tender_must_not_carry_amounts() {
        assert!(validate_external_tender(Money::zero(), Money::zero()).is_ok());

        let with_cash = validate_external_tender(Money::from_paise(100), Money::zero());
        assert!(matches!(with_cash, Err(CoreError::ExternalTenderSplit)));

        let with_credit = validate_external_tender(Money::zero(), Money::from_paise(100));
        assert!(matches!(with_credit, Err(CoreError::ExternalTenderSplit)));
    }

    #[test]
    fn test_day_close_balanced() {
        // 14560 = 10000 cash + 4560 credit + 0 card + 0 upi
        assert!(validate_day_close(
            Money::from_paise(14560),
            Money::from_paise(10000),
            Money::from_paise(4560),
            Money::zero(),
            Money::zero(),
        )
        .is_ok());
    }

    #[test]
    fn test_day_close_out_of_balance() {
        // Card total entered short by ₹50.00
        let result = validate_day_close(
            Money::from_paise(100_000),
            Money::from_paise(40_000),
            Money::from_paise(30_000),
            Money::from_paise(20_000),
            Money::from_paise(5_000),
        );
        match result {
            Err(CoreError::ReconciliationOutOfBalance { difference, .. }) => {
                assert_eq!(difference.paise(), 5_000);
            }
            other => panic!("expected ReconciliationOutOfBalance, got {other:?}"),
        }
    }

    #[test]
    fn test_day_close_tolerance_boundary() {
        let total = Money::from_paise(10_001);
        // Tenders sum to 10_000: off by one paisa, accepted.
        assert!(validate_day_close(
            total,
            Money::from_paise(10_000),
            Money::zero(),
            Money::zero(),
            Money::zero(),
        )
        .is_ok());
    }
}
