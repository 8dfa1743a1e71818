//! # Reconciliation Repository
//!
//! Database operations for day-close records.
//!
//! One row per (station, business date), created lazily by `ensure_row` the
//! first time anyone drafts or finalizes that day. The upsert doubles as the
//! write lock for the day-close critical section: whichever transaction runs
//! it first holds the row until commit, so concurrent finalizes of the same
//! day serialize instead of racing on the totals.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use forecourt_core::{DailyTotals, DayReconciliation, Money};

use crate::error::{DbError, DbResult};

/// Repository for day-reconciliation database operations.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    pool: SqlitePool,
}

impl ReconciliationRepository {
    /// Creates a new ReconciliationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReconciliationRepository { pool }
    }

    /// Gets the day-close record for a station and date, if one exists.
    pub async fn get(
        &self,
        station_id: &str,
        business_date: NaiveDate,
    ) -> DbResult<Option<DayReconciliation>> {
        let row = sqlx::query_as::<_, DayReconciliation>(
            r#"
            SELECT id, station_id, business_date,
                   total_sales_paise, cash_total_paise, credit_total_paise,
                   card_total_paise, upi_total_paise,
                   finalized, created_by, notes, created_at, updated_at
            FROM day_reconciliations
            WHERE station_id = ?1 AND business_date = ?2
            "#,
        )
        .bind(station_id)
        .bind(business_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists a station's day-close records, most recent date first.
    pub async fn recent(&self, station_id: &str, limit: i64) -> DbResult<Vec<DayReconciliation>> {
        let rows = sqlx::query_as::<_, DayReconciliation>(
            r#"
            SELECT id, station_id, business_date,
                   total_sales_paise, cash_total_paise, credit_total_paise,
                   card_total_paise, upi_total_paise,
                   finalized, created_by, notes, created_at, updated_at
            FROM day_reconciliations
            WHERE station_id = ?1
            ORDER BY business_date DESC
            LIMIT ?2
            "#,
        )
        .bind(station_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // Transaction functions
    // =========================================================================

    /// Upserts the day's row and returns it, inside the caller's transaction.
    ///
    /// First statement of every day-close transaction. The insert-or-touch
    /// write acquires the row lock; on conflict only `updated_at` moves, so
    /// the original `created_by` and `created_at` survive re-drafts and
    /// re-finalizes.
    pub async fn ensure_row(
        conn: &mut SqliteConnection,
        station_id: &str,
        business_date: NaiveDate,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> DbResult<DayReconciliation> {
        let row = sqlx::query_as::<_, DayReconciliation>(
            r#"
            INSERT INTO day_reconciliations (
                id, station_id, business_date,
                total_sales_paise, cash_total_paise, credit_total_paise,
                card_total_paise, upi_total_paise,
                finalized, created_by, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 0, 0, 0, 0, 0, 0, ?4, NULL, ?5, ?5)
            ON CONFLICT (station_id, business_date)
            DO UPDATE SET updated_at = excluded.updated_at
            RETURNING id, station_id, business_date,
                      total_sales_paise, cash_total_paise, credit_total_paise,
                      card_total_paise, upi_total_paise,
                      finalized, created_by, notes, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(station_id)
        .bind(business_date)
        .bind(created_by)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Whether the day is already finalized. Missing row counts as open.
    pub async fn is_finalized(
        conn: &mut SqliteConnection,
        station_id: &str,
        business_date: NaiveDate,
    ) -> DbResult<bool> {
        let finalized: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT finalized
            FROM day_reconciliations
            WHERE station_id = ?1 AND business_date = ?2
            "#,
        )
        .bind(station_id)
        .bind(business_date)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(finalized.unwrap_or(false))
    }

    /// Writes recomputed totals and declared settlements onto the draft row.
    pub async fn save_draft_row(
        conn: &mut SqliteConnection,
        totals: &DailyTotals,
        card_total: Money,
        upi_total: Money,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<DayReconciliation> {
        debug!(
            station_id = %totals.station_id,
            business_date = %totals.business_date,
            "Saving reconciliation draft"
        );

        Self::write_row(conn, totals, card_total, upi_total, notes, false, now).await
    }

    /// Writes final totals and flips the row to finalized.
    pub async fn finalize_row(
        conn: &mut SqliteConnection,
        totals: &DailyTotals,
        card_total: Money,
        upi_total: Money,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<DayReconciliation> {
        debug!(
            station_id = %totals.station_id,
            business_date = %totals.business_date,
            total_sales_paise = totals.total_sales_paise,
            "Finalizing reconciliation"
        );

        Self::write_row(conn, totals, card_total, upi_total, notes, true, now).await
    }

    async fn write_row(
        conn: &mut SqliteConnection,
        totals: &DailyTotals,
        card_total: Money,
        upi_total: Money,
        notes: Option<&str>,
        finalize: bool,
        now: DateTime<Utc>,
    ) -> DbResult<DayReconciliation> {
        let row = sqlx::query_as::<_, DayReconciliation>(
            r#"
            UPDATE day_reconciliations
            SET total_sales_paise = ?3,
                cash_total_paise = ?4,
                credit_total_paise = ?5,
                card_total_paise = ?6,
                upi_total_paise = ?7,
                finalized = CASE WHEN ?8 THEN 1 ELSE finalized END,
                notes = COALESCE(?9, notes),
                updated_at = ?10
            WHERE station_id = ?1 AND business_date = ?2
            RETURNING id, station_id, business_date,
                      total_sales_paise, cash_total_paise, credit_total_paise,
                      card_total_paise, upi_total_paise,
                      finalized, created_by, notes, created_at, updated_at
            "#,
        )
        .bind(&totals.station_id)
        .bind(totals.business_date)
        .bind(totals.total_sales_paise)
        .bind(totals.cash_total_paise)
        .bind(totals.credit_total_paise)
        .bind(card_total.paise())
        .bind(upi_total.paise())
        .bind(finalize)
        .bind(notes)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        row.ok_or_else(|| {
            DbError::not_found(
                "DayReconciliation",
                format!("{}/{}", totals.station_id, totals.business_date),
            )
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_db, STATION};

    fn totals_for(date: NaiveDate, sales: i64, cash: i64, credit: i64) -> DailyTotals {
        DailyTotals {
            station_id: STATION.to_string(),
            business_date: date,
            total_sales_paise: sales,
            cash_total_paise: cash,
            credit_total_paise: credit,
            sale_count: 1,
        }
    }

    #[tokio::test]
    async fn test_ensure_row_upserts_once_per_day() {
        let db = test_db().await;
        let date = Utc::now().date_naive();

        let mut tx = db.pool().begin().await.unwrap();
        let first = ReconciliationRepository::ensure_row(&mut tx, STATION, date, "mgr-1", Utc::now())
            .await
            .unwrap();
        let second =
            ReconciliationRepository::ensure_row(&mut tx, STATION, date, "mgr-2", Utc::now())
                .await
                .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.created_by, "mgr-1");
        assert!(!second.finalized);

        let stored = db.reconciliations().get(STATION, date).await.unwrap();
        assert_eq!(stored.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_finalize_row_sets_totals_and_flag() {
        let db = test_db().await;
        let date = Utc::now().date_naive();
        let totals = totals_for(date, 14_560, 10_000, 4_560);

        let mut tx = db.pool().begin().await.unwrap();
        ReconciliationRepository::ensure_row(&mut tx, STATION, date, "mgr-1", Utc::now())
            .await
            .unwrap();
        let row = ReconciliationRepository::finalize_row(
            &mut tx,
            &totals,
            Money::zero(),
            Money::zero(),
            Some("shift A"),
            Utc::now(),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert!(row.finalized);
        assert_eq!(row.total_sales_paise, 14_560);
        assert_eq!(row.cash_total_paise, 10_000);
        assert_eq!(row.credit_total_paise, 4_560);
        assert_eq!(row.notes.as_deref(), Some("shift A"));
    }

    #[tokio::test]
    async fn test_save_draft_keeps_finalized_untouched() {
        let db = test_db().await;
        let date = Utc::now().date_naive();
        let totals = totals_for(date, 6_400, 6_400, 0);

        let mut tx = db.pool().begin().await.unwrap();
        ReconciliationRepository::ensure_row(&mut tx, STATION, date, "mgr-1", Utc::now())
            .await
            .unwrap();
        let draft = ReconciliationRepository::save_draft_row(
            &mut tx,
            &totals,
            Money::zero(),
            Money::zero(),
            None,
            Utc::now(),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert!(!draft.finalized);
        assert_eq!(draft.total_sales_paise, 6_400);
        assert!(draft.notes.is_none());
    }

    #[tokio::test]
    async fn test_is_finalized_treats_missing_row_as_open() {
        let db = test_db().await;
        let date = Utc::now().date_naive();

        let mut conn = db.pool().acquire().await.unwrap();
        let finalized = ReconciliationRepository::is_finalized(&mut conn, STATION, date)
            .await
            .unwrap();
        assert!(!finalized);
    }

    #[tokio::test]
    async fn test_recent_orders_newest_date_first() {
        let db = test_db().await;
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        ReconciliationRepository::ensure_row(&mut tx, STATION, yesterday, "mgr-1", Utc::now())
            .await
            .unwrap();
        ReconciliationRepository::ensure_row(&mut tx, STATION, today, "mgr-1", Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let rows = db.reconciliations().recent(STATION, 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].business_date, today);
        assert_eq!(rows[1].business_date, yesterday);
    }
}
