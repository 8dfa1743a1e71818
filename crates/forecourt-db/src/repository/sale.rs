//! # Sale Repository
//!
//! Database operations for sale rows.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. POST (SaleService::create_sale)                                    │
//! │     └── insert() → Sale { status: Posted }                             │
//! │         (same transaction advances the nozzle meter and, for credit    │
//! │          sales, the creditor balance)                                  │
//! │                                                                         │
//! │  2a. (OPTIONAL) VOID                                                   │
//! │      └── mark_voided() → Sale { status: Voided }                       │
//! │          (credit unwound; meter optionally rolled back)                │
//! │                                                                         │
//! │  2b. DAY FINALIZE                                                      │
//! │      └── lock_day() → every posted sale of the day { status: Locked }  │
//! │          (locked sales can never be voided)                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are append-only: nothing here updates amounts or readings after
//! insert, only the status and void metadata.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use forecourt_core::{DailyTotals, Sale};

use crate::error::{DbError, DbResult};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, station_id, nozzle_id, user_id, fuel_type,
                   previous_reading_cl, cumulative_reading_cl, sale_volume_cl,
                   price_per_litre_paise, amount_paise,
                   cash_received_paise, credit_given_paise, credit_party_id,
                   payment_method, status,
                   voided_by, voided_at, void_reason, notes,
                   recorded_at, business_date
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists a station-day's sales, all statuses, newest first.
    pub async fn list_for_day(
        &self,
        station_id: &str,
        business_date: NaiveDate,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, station_id, nozzle_id, user_id, fuel_type,
                   previous_reading_cl, cumulative_reading_cl, sale_volume_cl,
                   price_per_litre_paise, amount_paise,
                   cash_received_paise, credit_given_paise, credit_party_id,
                   payment_method, status,
                   voided_by, voided_at, void_reason, notes,
                   recorded_at, business_date
            FROM sales
            WHERE station_id = ?1 AND business_date = ?2
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(station_id)
        .bind(business_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    // =========================================================================
    // Transaction functions
    // =========================================================================

    /// Inserts a sale row, inside the caller's transaction.
    pub async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(sale_id = %sale.id, nozzle_id = %sale.nozzle_id, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, station_id, nozzle_id, user_id, fuel_type,
                previous_reading_cl, cumulative_reading_cl, sale_volume_cl,
                price_per_litre_paise, amount_paise,
                cash_received_paise, credit_given_paise, credit_party_id,
                payment_method, status,
                voided_by, voided_at, void_reason, notes,
                recorded_at, business_date
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15,
                ?16, ?17, ?18, ?19,
                ?20, ?21
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.station_id)
        .bind(&sale.nozzle_id)
        .bind(&sale.user_id)
        .bind(sale.fuel_type)
        .bind(sale.previous_reading_cl)
        .bind(sale.cumulative_reading_cl)
        .bind(sale.sale_volume_cl)
        .bind(sale.price_per_litre_paise)
        .bind(sale.amount_paise)
        .bind(sale.cash_received_paise)
        .bind(sale.credit_given_paise)
        .bind(&sale.credit_party_id)
        .bind(sale.payment_method)
        .bind(sale.status)
        .bind(&sale.voided_by)
        .bind(sale.voided_at)
        .bind(&sale.void_reason)
        .bind(&sale.notes)
        .bind(sale.recorded_at)
        .bind(sale.business_date)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Write-locks the sale row and returns it, inside the caller's
    /// transaction.
    ///
    /// The self-assignment UPDATE takes the write lock before the status is
    /// inspected, so two concurrent voids of the same sale serialize and the
    /// second one sees `voided`. Returns `None` when the sale does not exist.
    pub async fn lock(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
        let touched = sqlx::query("UPDATE sales SET status = status WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if touched.rows_affected() == 0 {
            return Ok(None);
        }

        Self::get(conn, id).await
    }

    /// Gets a sale by ID, inside the caller's transaction.
    pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, station_id, nozzle_id, user_id, fuel_type,
                   previous_reading_cl, cumulative_reading_cl, sale_volume_cl,
                   price_per_litre_paise, amount_paise,
                   cash_received_paise, credit_given_paise, credit_party_id,
                   payment_method, status,
                   voided_by, voided_at, void_reason, notes,
                   recorded_at, business_date
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(sale)
    }

    /// Marks a posted sale as voided with its audit metadata.
    pub async fn mark_voided(
        conn: &mut SqliteConnection,
        id: &str,
        voided_by: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(sale_id = %id, voided_by = %voided_by, "Voiding sale");

        let result = sqlx::query(
            r#"
            UPDATE sales
            SET status = 'voided', voided_by = ?2, voided_at = ?3, void_reason = ?4
            WHERE id = ?1 AND status = 'posted'
            "#,
        )
        .bind(id)
        .bind(voided_by)
        .bind(now)
        .bind(reason)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (posted)", id));
        }

        Ok(())
    }

    /// Whether any sale on the nozzle was recorded at or after the given
    /// one. Gate for void-driven meter rollback.
    ///
    /// Voided later sales count too: their reading pairs are already part of
    /// the audit trail, and rolling back beneath them would let the meter
    /// re-dispense ranges they cover.
    pub async fn has_later_sale(
        conn: &mut SqliteConnection,
        nozzle_id: &str,
        sale_id: &str,
        recorded_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM sales
            WHERE nozzle_id = ?1 AND id != ?2 AND recorded_at >= ?3
            "#,
        )
        .bind(nozzle_id)
        .bind(sale_id)
        .bind(recorded_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count > 0)
    }

    /// Sums the station-day's non-voided sales by tender, inside the
    /// caller's transaction.
    pub async fn day_totals(
        conn: &mut SqliteConnection,
        station_id: &str,
        business_date: NaiveDate,
    ) -> DbResult<DailyTotals> {
        let (total_sales, cash_total, credit_total, sale_count) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT COALESCE(SUM(amount_paise), 0),
                       COALESCE(SUM(cash_received_paise), 0),
                       COALESCE(SUM(credit_given_paise), 0),
                       COUNT(*)
                FROM sales
                WHERE station_id = ?1 AND business_date = ?2 AND status != 'voided'
                "#,
            )
            .bind(station_id)
            .bind(business_date)
            .fetch_one(&mut *conn)
            .await?;

        Ok(DailyTotals {
            station_id: station_id.to_string(),
            business_date,
            total_sales_paise: total_sales,
            cash_total_paise: cash_total,
            credit_total_paise: credit_total,
            sale_count,
        })
    }

    /// Relabels the day's posted sales to locked. Returns how many rows
    /// changed (re-finalizing an unchanged day locks zero).
    pub async fn lock_day(
        conn: &mut SqliteConnection,
        station_id: &str,
        business_date: NaiveDate,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE sales
            SET status = 'locked'
            WHERE station_id = ?1 AND business_date = ?2 AND status = 'posted'
            "#,
        )
        .bind(station_id)
        .bind(business_date)
        .execute(&mut *conn)
        .await?;

        debug!(
            station_id = %station_id,
            business_date = %business_date,
            locked = result.rows_affected(),
            "Locked day's sales"
        );

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{posted_sale_row, seed_creditor, seed_nozzle, test_db, STATION};
    use forecourt_core::SaleStatus;

    #[tokio::test]
    async fn test_insert_and_fetch_round_trip() {
        let db = test_db().await;
        let nozzle = seed_nozzle(&db, 100_000).await;
        let sale = posted_sale_row(&nozzle, 100_000, 104_550, 14_560, 14_560, 0);

        let mut tx = db.pool().begin().await.unwrap();
        SaleRepository::insert(&mut tx, &sale).await.unwrap();
        tx.commit().await.unwrap();

        let fetched = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.sale_volume_cl, 4550);
        assert_eq!(fetched.amount_paise, 14_560);
        assert_eq!(fetched.status, SaleStatus::Posted);
        assert_eq!(fetched.business_date, sale.business_date);
    }

    #[tokio::test]
    async fn test_day_totals_exclude_voided() {
        let db = test_db().await;
        let nozzle = seed_nozzle(&db, 100_000).await;
        let creditor = seed_creditor(&db, "Sharma Transport", 0).await;
        let mut keep = posted_sale_row(&nozzle, 100_000, 104_550, 14_560, 14_560, 0);
        keep.cash_received_paise = 10_000;
        keep.credit_given_paise = 4_560;
        keep.credit_party_id = Some(creditor.id.clone());
        let void = posted_sale_row(&nozzle, 104_550, 106_550, 6_400, 6_400, 0);

        let mut tx = db.pool().begin().await.unwrap();
        SaleRepository::insert(&mut tx, &keep).await.unwrap();
        SaleRepository::insert(&mut tx, &void).await.unwrap();
        SaleRepository::mark_voided(&mut tx, &void.id, "mgr-1", "pump test", Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let totals = SaleRepository::day_totals(&mut conn, STATION, keep.business_date)
            .await
            .unwrap();

        assert_eq!(totals.sale_count, 1);
        assert_eq!(totals.total_sales_paise, 14_560);
        assert_eq!(totals.cash_total_paise, 10_000);
        assert_eq!(totals.credit_total_paise, 4_560);
    }

    #[tokio::test]
    async fn test_lock_day_only_touches_posted() {
        let db = test_db().await;
        let nozzle = seed_nozzle(&db, 100_000).await;
        let posted = posted_sale_row(&nozzle, 100_000, 104_550, 14_560, 14_560, 0);
        let voided = posted_sale_row(&nozzle, 104_550, 106_550, 6_400, 6_400, 0);

        let mut tx = db.pool().begin().await.unwrap();
        SaleRepository::insert(&mut tx, &posted).await.unwrap();
        SaleRepository::insert(&mut tx, &voided).await.unwrap();
        SaleRepository::mark_voided(&mut tx, &voided.id, "mgr-1", "spill", Utc::now())
            .await
            .unwrap();
        let locked = SaleRepository::lock_day(&mut tx, STATION, posted.business_date)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(locked, 1);
        let fetched = db.sales().get_by_id(&posted.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, SaleStatus::Locked);
        let fetched = db.sales().get_by_id(&voided.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, SaleStatus::Voided);
    }

    #[tokio::test]
    async fn test_has_later_sale() {
        let db = test_db().await;
        let nozzle = seed_nozzle(&db, 100_000).await;
        let first = posted_sale_row(&nozzle, 100_000, 104_550, 14_560, 14_560, 0);
        let mut second = posted_sale_row(&nozzle, 104_550, 106_550, 6_400, 6_400, 0);
        second.recorded_at = first.recorded_at + chrono::Duration::seconds(90);

        let mut tx = db.pool().begin().await.unwrap();
        SaleRepository::insert(&mut tx, &first).await.unwrap();
        SaleRepository::insert(&mut tx, &second).await.unwrap();

        assert!(
            SaleRepository::has_later_sale(&mut tx, &nozzle.id, &first.id, first.recorded_at)
                .await
                .unwrap()
        );
        assert!(
            !SaleRepository::has_later_sale(&mut tx, &nozzle.id, &second.id, second.recorded_at)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_mark_voided_requires_posted_status() {
        let db = test_db().await;
        let nozzle = seed_nozzle(&db, 100_000).await;
        let sale = posted_sale_row(&nozzle, 100_000, 104_550, 14_560, 14_560, 0);

        let mut tx = db.pool().begin().await.unwrap();
        SaleRepository::insert(&mut tx, &sale).await.unwrap();
        SaleRepository::mark_voided(&mut tx, &sale.id, "mgr-1", "typo", Utc::now())
            .await
            .unwrap();

        // Second void hits zero rows.
        let again = SaleRepository::mark_voided(&mut tx, &sale.id, "mgr-1", "typo", Utc::now()).await;
        assert!(matches!(again, Err(DbError::NotFound { .. })));
    }
}
