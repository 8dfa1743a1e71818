//! # Fuel Price Repository
//!
//! Storage for the time-bounded price intervals of each (station, fuel type).
//!
//! ## Interval Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_price(₹94.77, from=Mar 01)   set_price(₹96.10, from=Mar 09)       │
//! │                                                                         │
//! │  petrol  ──[₹92.00──────────)[₹94.77──────────)[₹96.10── open ──►      │
//! │            Feb 12        Mar 01            Mar 09                       │
//! │                                                                         │
//! │  price_in_effect(Mar 05) walks the intervals: effective_from <= at     │
//! │  and (effective_to open or > at), newest effective_from wins.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A partial unique index guarantees at most one open row per
//! (station, fuel type), whatever the interleaving.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use forecourt_core::{FuelPrice, FuelType, Money};

use crate::error::DbResult;

/// Repository for fuel price intervals.
#[derive(Debug, Clone)]
pub struct FuelPriceRepository {
    pool: SqlitePool,
}

impl FuelPriceRepository {
    /// Creates a new FuelPriceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FuelPriceRepository { pool }
    }

    /// Sets a new price: closes the open interval and opens a new one,
    /// atomically.
    ///
    /// The closed row's `effective_to` is set to the new row's
    /// `effective_from`, so the timeline has no gaps and no overlaps.
    /// Backdated `effective_from` values are tolerated; the read side picks
    /// the latest qualifying interval, so a degenerate (zero-width) closed
    /// interval is harmless.
    pub async fn set_price(
        &self,
        station_id: &str,
        fuel_type: FuelType,
        price_per_litre: Money,
        effective_from: DateTime<Utc>,
    ) -> DbResult<FuelPrice> {
        debug!(
            station_id = %station_id,
            fuel_type = %fuel_type,
            price = %price_per_litre,
            "Setting fuel price"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE fuel_prices
            SET effective_to = ?1
            WHERE station_id = ?2 AND fuel_type = ?3 AND effective_to IS NULL
            "#,
        )
        .bind(effective_from)
        .bind(station_id)
        .bind(fuel_type)
        .execute(&mut *tx)
        .await?;

        let price = FuelPrice {
            id: Uuid::new_v4().to_string(),
            station_id: station_id.to_string(),
            fuel_type,
            price_per_litre_paise: price_per_litre.paise(),
            effective_from,
            effective_to: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO fuel_prices (
                id, station_id, fuel_type, price_per_litre_paise,
                effective_from, effective_to, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&price.id)
        .bind(&price.station_id)
        .bind(price.fuel_type)
        .bind(price.price_per_litre_paise)
        .bind(price.effective_from)
        .bind(price.effective_to)
        .bind(price.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(price)
    }

    /// Returns the currently open price row, if any.
    pub async fn get_current(
        &self,
        station_id: &str,
        fuel_type: FuelType,
    ) -> DbResult<Option<FuelPrice>> {
        let price = sqlx::query_as::<_, FuelPrice>(
            r#"
            SELECT id, station_id, fuel_type, price_per_litre_paise,
                   effective_from, effective_to, created_at
            FROM fuel_prices
            WHERE station_id = ?1 AND fuel_type = ?2 AND effective_to IS NULL
            "#,
        )
        .bind(station_id)
        .bind(fuel_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    /// Returns the price in effect at the given instant.
    pub async fn get_in_effect(
        &self,
        station_id: &str,
        fuel_type: FuelType,
        at: DateTime<Utc>,
    ) -> DbResult<Option<FuelPrice>> {
        let mut conn = self.pool.acquire().await?;
        Self::price_in_effect(&mut conn, station_id, fuel_type, at).await
    }

    /// Returns recent price rows, newest first, for audit display.
    pub async fn history(
        &self,
        station_id: &str,
        fuel_type: FuelType,
        limit: i64,
    ) -> DbResult<Vec<FuelPrice>> {
        let rows = sqlx::query_as::<_, FuelPrice>(
            r#"
            SELECT id, station_id, fuel_type, price_per_litre_paise,
                   effective_from, effective_to, created_at
            FROM fuel_prices
            WHERE station_id = ?1 AND fuel_type = ?2
            ORDER BY effective_from DESC
            LIMIT ?3
            "#,
        )
        .bind(station_id)
        .bind(fuel_type)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // Transaction functions
    // =========================================================================

    /// Returns the price in effect at `at`, inside the caller's transaction.
    ///
    /// The window test is half-open (`effective_from <= at < effective_to`);
    /// when backdating has produced more than one qualifying row, the latest
    /// `effective_from` wins.
    pub async fn price_in_effect(
        conn: &mut SqliteConnection,
        station_id: &str,
        fuel_type: FuelType,
        at: DateTime<Utc>,
    ) -> DbResult<Option<FuelPrice>> {
        let price = sqlx::query_as::<_, FuelPrice>(
            r#"
            SELECT id, station_id, fuel_type, price_per_litre_paise,
                   effective_from, effective_to, created_at
            FROM fuel_prices
            WHERE station_id = ?1
              AND fuel_type = ?2
              AND effective_from <= ?3
              AND (effective_to IS NULL OR effective_to > ?3)
            ORDER BY effective_from DESC
            LIMIT 1
            "#,
        )
        .bind(station_id)
        .bind(fuel_type)
        .bind(at)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(price)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
