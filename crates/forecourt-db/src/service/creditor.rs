//! # Creditor Service
//!
//! Registers credit accounts and records payments against them.
//!
//! The running balance itself only moves through three doors: credit sales
//! add to it (SaleService), voids of credit sales subtract from it
//! (SaleService), and payments subtract from it (here). A payment larger
//! than the outstanding balance is legal and simply leaves the account in
//! advance, with a negative balance.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use forecourt_core::validation::{validate_party_name, validate_payment_amount, validate_station_id};
use forecourt_core::{
    CoreError, CreditPayment, Creditor, Money, PaymentMethod, RequestContext, ValidationError,
};

use crate::error::{DbError, ServiceError, ServiceResult};
use crate::repository::creditor::CreditorRepository;

/// Service for creditor accounts and their payments.
#[derive(Debug, Clone)]
pub struct CreditorService {
    pool: SqlitePool,
}

impl CreditorService {
    /// Creates a new CreditorService.
    pub fn new(pool: SqlitePool) -> Self {
        CreditorService { pool }
    }

    /// Registers a credit account for a station.
    ///
    /// A zero limit means unlimited; the limit check in the sale path only
    /// engages for positive limits.
    pub async fn register(
        &self,
        station_id: &str,
        party_name: &str,
        phone: Option<String>,
        credit_limit: Money,
    ) -> ServiceResult<Creditor> {
        validate_station_id(station_id).map_err(CoreError::from)?;
        validate_party_name(party_name).map_err(CoreError::from)?;
        if credit_limit.is_negative() {
            return Err(CoreError::from(ValidationError::MustNotBeNegative {
                field: "credit_limit".to_string(),
            })
            .into());
        }

        let now = Utc::now();
        let creditor = Creditor {
            id: Uuid::new_v4().to_string(),
            station_id: station_id.to_string(),
            party_name: party_name.trim().to_string(),
            phone,
            running_balance_paise: 0,
            credit_limit_paise: credit_limit.paise(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.repo().insert(&creditor).await?;

        info!(
            creditor_id = %creditor.id,
            station_id = %station_id,
            party_name = %creditor.party_name,
            "Creditor registered"
        );

        Ok(creditor)
    }

    /// Records a payment received against a creditor's balance.
    ///
    /// The balance decrement and the payment row commit together. Works on
    /// deactivated accounts, since parties settle old dues after closure,
    /// and may push the balance negative.
    pub async fn record_payment(
        &self,
        ctx: &RequestContext,
        creditor_id: &str,
        amount: Money,
        method: PaymentMethod,
        reference: Option<String>,
        notes: Option<String>,
    ) -> ServiceResult<CreditPayment> {
        validate_payment_amount(amount).map_err(CoreError::from)?;
        match method {
            PaymentMethod::Cash | PaymentMethod::Card | PaymentMethod::Upi => {}
            PaymentMethod::Credit | PaymentMethod::Mixed => {
                return Err(CoreError::from(ValidationError::InvalidFormat {
                    field: "method".to_string(),
                    reason: "payments settle in cash, card or upi".to_string(),
                })
                .into());
            }
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let creditor = CreditorRepository::reverse_credit(&mut tx, creditor_id, amount, now)
            .await?
            .ok_or_else(|| ServiceError::CreditorNotFound {
                creditor_id: creditor_id.to_string(),
            })?;

        let payment = CreditPayment {
            id: Uuid::new_v4().to_string(),
            creditor_id: creditor_id.to_string(),
            amount_paise: amount.paise(),
            method,
            reference,
            received_by: ctx.user_id.clone(),
            notes,
            created_at: now,
        };
        CreditorRepository::insert_payment(&mut tx, &payment).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            creditor_id = %creditor_id,
            amount = %amount,
            method = ?payment.method,
            new_balance = %creditor.running_balance(),
            "Creditor payment recorded"
        );

        Ok(payment)
    }

    /// Updates a creditor's credit limit.
    pub async fn set_credit_limit(
        &self,
        creditor_id: &str,
        credit_limit: Money,
    ) -> ServiceResult<Creditor> {
        if credit_limit.is_negative() {
            return Err(CoreError::from(ValidationError::MustNotBeNegative {
                field: "credit_limit".to_string(),
            })
            .into());
        }

        self.repo().set_credit_limit(creditor_id, credit_limit).await?;
        self.get(creditor_id).await
    }

    /// Activates or deactivates a credit account.
    ///
    /// Deactivation stops new credit sales; the balance stays collectable.
    pub async fn set_active(&self, creditor_id: &str, active: bool) -> ServiceResult<()> {
        self.repo().set_active(creditor_id, active).await?;
        Ok(())
    }

    /// Gets a creditor by ID.
    pub async fn get(&self, creditor_id: &str) -> ServiceResult<Creditor> {
        self.repo()
            .get_by_id(creditor_id)
            .await?
            .ok_or_else(|| ServiceError::CreditorNotFound {
                creditor_id: creditor_id.to_string(),
            })
    }

    /// Lists a station's creditors, alphabetically by party name.
    pub async fn list(
        &self,
        station_id: &str,
        include_inactive: bool,
    ) -> ServiceResult<Vec<Creditor>> {
        validate_station_id(station_id).map_err(CoreError::from)?;
        let creditors = self.repo().list_by_station(station_id, include_inactive).await?;
        Ok(creditors)
    }

    /// Lists a creditor's payments, newest first.
    pub async fn payments_for(&self, creditor_id: &str) -> ServiceResult<Vec<CreditPayment>> {
        let payments = self.repo().payments_for(creditor_id).await?;
        Ok(payments)
    }

    fn repo(&self) -> CreditorRepository {
        CreditorRepository::new(self.pool.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ctx, manager_ctx, test_db, STATION};

    #[tokio::test]
    async fn test_register_starts_at_zero_balance() {
        let db = test_db().await;
        let service = db.creditor_service();

        let creditor = service
            .register(STATION, "  Sharma Transport  ", Some("9876543210".into()), Money::from_paise(500_000))
            .await
            .unwrap();

        assert_eq!(creditor.party_name, "Sharma Transport");
        assert_eq!(creditor.running_balance_paise, 0);
        assert_eq!(creditor.credit_limit_paise, 500_000);
        assert!(creditor.active);

        let stored = service.get(&creditor.id).await.unwrap();
        assert_eq!(stored.phone.as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn test_register_rejects_blank_party_name() {
        let db = test_db().await;
        let service = db.creditor_service();

        let err = service
            .register(STATION, "   ", None, Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_payment_reduces_balance_and_logs_row() {
        let db = test_db().await;
        let service = db.creditor_service();
        let creditor = service
            .register(STATION, "Anand Dairy", None, Money::zero())
            .await
            .unwrap();

        // Put some credit on the book first.
        let mut tx = db.pool().begin().await.unwrap();
        CreditorRepository::apply_credit(&mut tx, &creditor.id, Money::from_paise(20_000), Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let payment = service
            .record_payment(
                &manager_ctx(),
                &creditor.id,
                Money::from_paise(15_000),
                PaymentMethod::Cash,
                Some("receipt 42".into()),
                None,
            )
            .await
            .unwrap();

        assert_eq!(payment.amount_paise, 15_000);
        assert_eq!(payment.received_by, "mgr-1");

        let after = service.get(&creditor.id).await.unwrap();
        assert_eq!(after.running_balance_paise, 5_000);

        let history = service.payments_for(&creditor.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reference.as_deref(), Some("receipt 42"));
    }

    #[tokio::test]
    async fn test_overpayment_leaves_negative_balance() {
        let db = test_db().await;
        let service = db.creditor_service();
        let creditor = service
            .register(STATION, "Anand Dairy", None, Money::zero())
            .await
            .unwrap();

        service
            .record_payment(
                &ctx(),
                &creditor.id,
                Money::from_paise(5_000),
                PaymentMethod::Upi,
                None,
                None,
            )
            .await
            .unwrap();

        let after = service.get(&creditor.id).await.unwrap();
        assert_eq!(after.running_balance_paise, -5_000);
    }

    #[tokio::test]
    async fn test_payment_rejects_non_settlement_method() {
        let db = test_db().await;
        let service = db.creditor_service();
        let creditor = service
            .register(STATION, "Anand Dairy", None, Money::zero())
            .await
            .unwrap();

        let err = service
            .record_payment(
                &ctx(),
                &creditor.id,
                Money::from_paise(5_000),
                PaymentMethod::Credit,
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_payment_rejects_non_positive_amount() {
        let db = test_db().await;
        let service = db.creditor_service();
        let creditor = service
            .register(STATION, "Anand Dairy", None, Money::zero())
            .await
            .unwrap();

        let err = service
            .record_payment(&ctx(), &creditor.id, Money::zero(), PaymentMethod::Cash, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_payment_works_on_deactivated_account() {
        let db = test_db().await;
        let service = db.creditor_service();
        let creditor = service
            .register(STATION, "Closed Haulage", None, Money::zero())
            .await
            .unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        CreditorRepository::apply_credit(&mut tx, &creditor.id, Money::from_paise(9_000), Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        service.set_active(&creditor.id, false).await.unwrap();
        service
            .record_payment(
                &ctx(),
                &creditor.id,
                Money::from_paise(9_000),
                PaymentMethod::Cash,
                None,
                None,
            )
            .await
            .unwrap();

        let after = service.get(&creditor.id).await.unwrap();
        assert_eq!(after.running_balance_paise, 0);
        assert!(!after.active);
    }

    #[tokio::test]
    async fn test_unknown_creditor_payment_rejected() {
        let db = test_db().await;
        let service = db.creditor_service();

        let err = service
            .record_payment(
                &ctx(),
                "no-such-creditor",
                Money::from_paise(1_000),
                PaymentMethod::Cash,
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CreditorNotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_credit_limit_round_trips() {
        let db = test_db().await;
        let service = db.creditor_service();
        let creditor = service
            .register(STATION, "Anand Dairy", None, Money::zero())
            .await
            .unwrap();

        let updated = service
            .set_credit_limit(&creditor.id, Money::from_paise(250_000))
            .await
            .unwrap();
        assert_eq!(updated.credit_limit_paise, 250_000);

        let err = service
            .set_credit_limit(&creditor.id, Money::from_paise(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }
}
