//! # Creditor Repository
//!
//! Storage for creditor accounts, their running balances, and the payment
//! receipt trail.
//!
//! Balance movement is always an atomic SQL increment
//! (`running_balance_paise = running_balance_paise ± ?`), never a
//! read-modify-write in application code; `RETURNING` hands back the row the
//! statement produced so the caller can evaluate the credit limit against
//! exactly the balance it created.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use forecourt_core::{CreditPayment, Creditor, Money};

use crate::error::{DbError, DbResult};

/// Repository for creditor database operations.
#[derive(Debug, Clone)]
pub struct CreditorRepository {
    pool: SqlitePool,
}

impl CreditorRepository {
    /// Creates a new CreditorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditorRepository { pool }
    }

    /// Inserts a creditor account.
    pub async fn insert(&self, creditor: &Creditor) -> DbResult<()> {
        debug!(creditor_id = %creditor.id, party = %creditor.party_name, "Inserting creditor");

        sqlx::query(
            r#"
            INSERT INTO creditors (
                id, station_id, party_name, phone,
                running_balance_paise, credit_limit_paise,
                active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&creditor.id)
        .bind(&creditor.station_id)
        .bind(&creditor.party_name)
        .bind(&creditor.phone)
        .bind(creditor.running_balance_paise)
        .bind(creditor.credit_limit_paise)
        .bind(creditor.active)
        .bind(creditor.created_at)
        .bind(creditor.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a creditor by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Creditor>> {
        let creditor = sqlx::query_as::<_, Creditor>(
            r#"
            SELECT id, station_id, party_name, phone,
                   running_balance_paise, credit_limit_paise,
                   active, created_at, updated_at
            FROM creditors
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(creditor)
    }

    /// Lists a station's creditors by name.
    pub async fn list_by_station(
        &self,
        station_id: &str,
        include_inactive: bool,
    ) -> DbResult<Vec<Creditor>> {
        let creditors = sqlx::query_as::<_, Creditor>(
            r#"
            SELECT id, station_id, party_name, phone,
                   running_balance_paise, credit_limit_paise,
                   active, created_at, updated_at
            FROM creditors
            WHERE station_id = ?1 AND (active = 1 OR ?2)
            ORDER BY party_name
            "#,
        )
        .bind(station_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(creditors)
    }

    /// Activates or deactivates a creditor account (soft delete).
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE creditors SET active = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(active)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Creditor", id));
        }

        Ok(())
    }

    /// Updates a creditor's credit limit. Zero or negative clears the limit.
    pub async fn set_credit_limit(&self, id: &str, limit: Money) -> DbResult<()> {
        debug!(creditor_id = %id, limit = %limit, "Updating credit limit");

        let result = sqlx::query(
            "UPDATE creditors SET credit_limit_paise = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(limit.paise())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Creditor", id));
        }

        Ok(())
    }

    /// Lists payment receipts for a creditor, newest first.
    pub async fn payments_for(&self, creditor_id: &str) -> DbResult<Vec<CreditPayment>> {
        let payments = sqlx::query_as::<_, CreditPayment>(
            r#"
            SELECT id, creditor_id, amount_paise, method,
                   reference, received_by, notes, created_at
            FROM credit_payments
            WHERE creditor_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creditor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    // =========================================================================
    // Transaction functions
    // =========================================================================

    /// Atomically increments a creditor's running balance and returns the
    /// updated row.
    ///
    /// Only active accounts accept new credit; `None` means the creditor is
    /// missing or inactive and the caller's transaction should abort.
    pub async fn apply_credit(
        conn: &mut SqliteConnection,
        creditor_id: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Creditor>> {
        debug!(creditor_id = %creditor_id, amount = %amount, "Applying credit");

        let creditor = sqlx::query_as::<_, Creditor>(
            r#"
            UPDATE creditors
            SET running_balance_paise = running_balance_paise + ?1, updated_at = ?2
            WHERE id = ?3 AND active = 1
            RETURNING id, station_id, party_name, phone,
                      running_balance_paise, credit_limit_paise,
                      active, created_at, updated_at
            "#,
        )
        .bind(amount.paise())
        .bind(now)
        .bind(creditor_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(creditor)
    }

    /// Atomically decrements a creditor's running balance and returns the
    /// updated row.
    ///
    /// Works on inactive accounts too: a void must always be able to unwind
    /// its credit, and a payment against an old account must still land.
    /// The balance may go negative (credit-in-favor).
    pub async fn reverse_credit(
        conn: &mut SqliteConnection,
        creditor_id: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Creditor>> {
        debug!(creditor_id = %creditor_id, amount = %amount, "Reversing credit");

        let creditor = sqlx::query_as::<_, Creditor>(
            r#"
            UPDATE creditors
            SET running_balance_paise = running_balance_paise - ?1, updated_at = ?2
            WHERE id = ?3
            RETURNING id, station_id, party_name, phone,
                      running_balance_paise, credit_limit_paise,
                      active, created_at, updated_at
            "#,
        )
        .bind(amount.paise())
        .bind(now)
        .bind(creditor_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(creditor)
    }

    /// Appends a payment receipt row, inside the caller's transaction.
    pub async fn insert_payment(
        conn: &mut SqliteConnection,
        payment: &CreditPayment,
    ) -> DbResult<()> {
        debug!(
            payment_id = %payment.id,
            creditor_id = %payment.creditor_id,
            amount = %payment.amount(),
            "Recording credit payment"
        );

        sqlx::query(
            r#"
            INSERT INTO credit_payments (
                id, creditor_id, amount_paise, method,
                reference, received_by, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.creditor_id)
        .bind(payment.amount_paise)
        .bind(payment.method)
        .bind(&payment.reference)
        .bind(&payment.received_by)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_creditor, test_db, STATION};

    #[tokio::test]
    async fn test_apply_credit_increments_atomically() {
        let db = test_db().await;
        let creditor = seed_creditor(&db, "Sharma Transport", 500_000).await;

        let mut tx = db.pool().begin().await.unwrap();
        let updated =
            CreditorRepository::apply_credit(&mut tx, &creditor.id, Money::from_paise(4560), Utc::now())
                .await
                .unwrap()
                .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(updated.running_balance_paise, 4560);

        let fetched = db.creditors().get_by_id(&creditor.id).await.unwrap().unwrap();
        assert_eq!(fetched.running_balance_paise, 4560);
    }

    #[tokio::test]
    async fn test_apply_credit_refuses_inactive_account() {
        let db = test_db().await;
        let creditor = seed_creditor(&db, "Old Account", 0).await;
        db.creditors().set_active(&creditor.id, false).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let updated =
            CreditorRepository::apply_credit(&mut tx, &creditor.id, Money::from_paise(100), Utc::now())
                .await
                .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_reverse_credit_works_on_inactive_account() {
        let db = test_db().await;
        let creditor = seed_creditor(&db, "Old Account", 0).await;

        let mut tx = db.pool().begin().await.unwrap();
        CreditorRepository::apply_credit(&mut tx, &creditor.id, Money::from_paise(10_000), Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        db.creditors().set_active(&creditor.id, false).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let updated =
            CreditorRepository::reverse_credit(&mut tx, &creditor.id, Money::from_paise(10_000), Utc::now())
                .await
                .unwrap()
                .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(updated.running_balance_paise, 0);
    }

    #[tokio::test]
    async fn test_list_by_station_filters_inactive() {
        let db = test_db().await;
        let active = seed_creditor(&db, "Anand Dairy", 0).await;
        let inactive = seed_creditor(&db, "Bharat Logistics", 0).await;
        db.creditors().set_active(&inactive.id, false).await.unwrap();

        let only_active = db.creditors().list_by_station(STATION, false).await.unwrap();
        assert_eq!(only_active.len(), 1);
        assert_eq!(only_active[0].id, active.id);

        let all = db.creditors().list_by_station(STATION, true).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
