//! # Reconciliation Service
//!
//! Drafts and finalizes day-close records.
//!
//! ## Finalize
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      finalize transaction                               │
//! │                                                                         │
//! │  1. upsert day row (write)          ── serializes per (station, day)   │
//! │  2. recompute totals from sales     ── never trusts caller figures     │
//! │  3. tenders must balance            ── cash + credit + card + upi      │
//! │     against total sales                within one paisa                │
//! │  4. write totals, flip finalized    ── row is permanent afterwards     │
//! │  5. lock the day's posted sales     ── locked sales cannot be voided   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Finalize is idempotent per (station, day): running it again recomputes
//! and updates the same row, picking up sales posted since, and never
//! produces a second record. Drafts take the same path minus the balance
//! check and the lock, and are refused once the day is finalized.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;

use forecourt_core::tender::validate_day_close;
use forecourt_core::validation::{validate_station_id, validate_tender_total};
use forecourt_core::{CoreError, DailyTotals, DayReconciliation, Money, RequestContext};

use crate::error::{DbError, ServiceError, ServiceResult};
use crate::repository::reconciliation::ReconciliationRepository;
use crate::repository::sale::SaleRepository;

/// Service for day-close reconciliation.
#[derive(Debug, Clone)]
pub struct ReconciliationService {
    pool: SqlitePool,
}

impl ReconciliationService {
    /// Creates a new ReconciliationService.
    pub fn new(pool: SqlitePool) -> Self {
        ReconciliationService { pool }
    }

    /// Sums a station-day's non-voided sales by tender.
    ///
    /// Read-only preview for the day-close screen; the finalize path
    /// recomputes inside its own transaction rather than trusting this.
    pub async fn compute_daily_totals(
        &self,
        station_id: &str,
        business_date: NaiveDate,
    ) -> ServiceResult<DailyTotals> {
        validate_station_id(station_id).map_err(CoreError::from)?;

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        let totals = SaleRepository::day_totals(&mut conn, station_id, business_date).await?;
        Ok(totals)
    }

    /// Saves a work-in-progress day-close record.
    ///
    /// Recomputes the sales-side totals and stores the declared card/UPI
    /// settlements without requiring the day to balance yet. Refused once
    /// the day is finalized.
    pub async fn save_draft(
        &self,
        ctx: &RequestContext,
        station_id: &str,
        business_date: NaiveDate,
        card_total: Money,
        upi_total: Money,
        notes: Option<&str>,
    ) -> ServiceResult<DayReconciliation> {
        validate_station_id(station_id).map_err(CoreError::from)?;
        validate_tender_total("card_total", card_total).map_err(CoreError::from)?;
        validate_tender_total("upi_total", upi_total).map_err(CoreError::from)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let row = ReconciliationRepository::ensure_row(
            &mut tx,
            station_id,
            business_date,
            &ctx.user_id,
            now,
        )
        .await?;
        if row.finalized {
            return Err(ServiceError::ReconciliationLocked {
                station_id: station_id.to_string(),
                business_date,
            });
        }

        let totals = SaleRepository::day_totals(&mut tx, station_id, business_date).await?;
        let draft = ReconciliationRepository::save_draft_row(
            &mut tx, &totals, card_total, upi_total, notes, now,
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            station_id = %station_id,
            business_date = %business_date,
            total_sales = %draft.total_sales(),
            "Reconciliation draft saved"
        );

        Ok(draft)
    }

    /// Finalizes a station-day.
    ///
    /// The recomputed cash/credit totals plus the declared card/UPI
    /// settlements must balance against total sales to within one paisa.
    /// On success the row flips to finalized and every posted sale of the
    /// day is relabeled locked. Finalizing an already-final day updates
    /// the same row in place.
    pub async fn finalize(
        &self,
        ctx: &RequestContext,
        station_id: &str,
        business_date: NaiveDate,
        card_total: Money,
        upi_total: Money,
        notes: Option<&str>,
    ) -> ServiceResult<DayReconciliation> {
        validate_station_id(station_id).map_err(CoreError::from)?;
        validate_tender_total("card_total", card_total).map_err(CoreError::from)?;
        validate_tender_total("upi_total", upi_total).map_err(CoreError::from)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        ReconciliationRepository::ensure_row(&mut tx, station_id, business_date, &ctx.user_id, now)
            .await?;

        let totals = SaleRepository::day_totals(&mut tx, station_id, business_date).await?;
        validate_day_close(
            totals.total_sales(),
            totals.cash_total(),
            totals.credit_total(),
            card_total,
            upi_total,
        )?;

        let row = ReconciliationRepository::finalize_row(
            &mut tx, &totals, card_total, upi_total, notes, now,
        )
        .await?;
        let locked = SaleRepository::lock_day(&mut tx, station_id, business_date).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            station_id = %station_id,
            business_date = %business_date,
            total_sales = %row.total_sales(),
            sale_count = totals.sale_count,
            locked_sales = locked,
            "Day finalized"
        );

        Ok(row)
    }

    /// Gets the day-close record for a station and date, if one exists.
    pub async fn get(
        &self,
        station_id: &str,
        business_date: NaiveDate,
    ) -> ServiceResult<Option<DayReconciliation>> {
        let row = ReconciliationRepository::new(self.pool.clone())
            .get(station_id, business_date)
            .await?;
        Ok(row)
    }

    /// Lists a station's day-close records, most recent date first.
    pub async fn recent(
        &self,
        station_id: &str,
        limit: i64,
    ) -> ServiceResult<Vec<DayReconciliation>> {
        validate_station_id(station_id).map_err(CoreError::from)?;
        let rows = ReconciliationRepository::new(self.pool.clone())
            .recent(station_id, limit)
            .await?;
        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
