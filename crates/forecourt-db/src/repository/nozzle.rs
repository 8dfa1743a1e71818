//! # Nozzle Repository
//!
//! Storage for nozzles and their cumulative meter readings.
//!
//! The interesting part is [`NozzleRepository::lock`]: the sale engine's
//! transaction calls it first, and its self-assignment UPDATE takes SQLite's
//! write lock before `current_reading_cl` is read. Two concurrent sales on
//! the same nozzle therefore serialize here, and the second one prices its
//! volume against the reading the first one left behind.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use forecourt_core::{FuelType, Nozzle, Volume};

use crate::error::{DbError, DbResult};

/// Repository for nozzle database operations.
#[derive(Debug, Clone)]
pub struct NozzleRepository {
    pool: SqlitePool,
}

impl NozzleRepository {
    /// Creates a new NozzleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NozzleRepository { pool }
    }

    /// Registers a nozzle with its opening totalizer value.
    ///
    /// `current_reading` starts equal to `initial_reading`; from then on the
    /// meter only moves through the sale engine.
    pub async fn register(
        &self,
        pump_id: &str,
        fuel_type: FuelType,
        initial_reading: Volume,
    ) -> DbResult<Nozzle> {
        let now = Utc::now();
        let nozzle = Nozzle {
            id: Uuid::new_v4().to_string(),
            pump_id: pump_id.to_string(),
            fuel_type,
            initial_reading_cl: initial_reading.centilitres(),
            current_reading_cl: initial_reading.centilitres(),
            active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(nozzle_id = %nozzle.id, pump_id = %pump_id, "Registering nozzle");

        sqlx::query(
            r#"
            INSERT INTO nozzles (
                id, pump_id, fuel_type,
                initial_reading_cl, current_reading_cl,
                active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&nozzle.id)
        .bind(&nozzle.pump_id)
        .bind(nozzle.fuel_type)
        .bind(nozzle.initial_reading_cl)
        .bind(nozzle.current_reading_cl)
        .bind(nozzle.active)
        .bind(nozzle.created_at)
        .bind(nozzle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(nozzle)
    }

    /// Gets a nozzle by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Nozzle>> {
        let nozzle = sqlx::query_as::<_, Nozzle>(
            r#"
            SELECT id, pump_id, fuel_type,
                   initial_reading_cl, current_reading_cl,
                   active, created_at, updated_at
            FROM nozzles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(nozzle)
    }

    /// Lists the nozzles on a pump, active first.
    pub async fn list_by_pump(&self, pump_id: &str) -> DbResult<Vec<Nozzle>> {
        let nozzles = sqlx::query_as::<_, Nozzle>(
            r#"
            SELECT id, pump_id, fuel_type,
                   initial_reading_cl, current_reading_cl,
                   active, created_at, updated_at
            FROM nozzles
            WHERE pump_id = ?1
            ORDER BY active DESC, created_at
            "#,
        )
        .bind(pump_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(nozzles)
    }

    /// Activates or deactivates a nozzle (soft delete).
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE nozzles SET active = ?2, updated_at = ?3 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Nozzle", id));
        }

        Ok(())
    }

    // =========================================================================
    // Transaction functions
    // =========================================================================

    /// Write-locks the nozzle row and returns it, inside the caller's
    /// transaction.
    ///
    /// The self-assignment UPDATE is a real write: under SQLite's
    /// single-writer model it acquires the database write lock, so the
    /// reading returned below stays current until the transaction ends.
    /// Returns `None` when the nozzle does not exist.
    pub async fn lock(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Nozzle>> {
        let touched = sqlx::query("UPDATE nozzles SET updated_at = updated_at WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if touched.rows_affected() == 0 {
            return Ok(None);
        }

        let nozzle = sqlx::query_as::<_, Nozzle>(
            r#"
            SELECT id, pump_id, fuel_type,
                   initial_reading_cl, current_reading_cl,
                   active, created_at, updated_at
            FROM nozzles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(nozzle)
    }

    /// Advances the meter to a new cumulative reading.
    ///
    /// The caller has already validated monotonicity against the locked row
    /// (`Nozzle::validate_advance`).
    pub async fn advance(
        conn: &mut SqliteConnection,
        id: &str,
        new_reading: Volume,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(nozzle_id = %id, reading = %new_reading, "Advancing meter");

        let result =
            sqlx::query("UPDATE nozzles SET current_reading_cl = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(new_reading.centilitres())
                .bind(now)
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Nozzle", id));
        }

        Ok(())
    }

    /// Restores the meter to an earlier reading (void rollback).
    ///
    /// The caller has already established that the voided sale is the
    /// nozzle's most recent one.
    pub async fn set_reading(
        conn: &mut SqliteConnection,
        id: &str,
        reading: Volume,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(nozzle_id = %id, reading = %reading, "Rolling meter back");

        let result =
            sqlx::query("UPDATE nozzles SET current_reading_cl = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(reading.centilitres())
                .bind(now)
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Nozzle", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_db;

    #[tokio::test]
    async fn test_register_starts_current_at_initial() {
        let db = test_db().await;
        let repo = db.nozzles();

        let nozzle = repo
            .register("pump-1", FuelType::Petrol, Volume::from_centilitres(100_000))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&nozzle.id).await.unwrap().unwrap();
        assert_eq!(fetched.initial_reading_cl, 100_000);
        assert_eq!(fetched.current_reading_cl, 100_000);
        assert!(fetched.active);
    }

    #[tokio::test]
    async fn test_lock_missing_nozzle_returns_none() {
        let db = test_db().await;

        let mut tx = db.pool().begin().await.unwrap();
        let nozzle = NozzleRepository::lock(&mut tx, "no-such-nozzle")
            .await
            .unwrap();
        assert!(nozzle.is_none());
    }

    #[tokio::test]
    async fn test_advance_persists_reading() {
        let db = test_db().await;
        let repo = db.nozzles();
        let nozzle = repo
            .register("pump-1", FuelType::Diesel, Volume::from_centilitres(100_000))
            .await
            .unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        NozzleRepository::advance(
            &mut tx,
            &nozzle.id,
            Volume::from_centilitres(104_550),
            Utc::now(),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let fetched = repo.get_by_id(&nozzle.id).await.unwrap().unwrap();
        assert_eq!(fetched.current_reading_cl, 104_550);
    }

    #[tokio::test]
    async fn test_set_active_toggles() {
        let db = test_db().await;
        let repo = db.nozzles();
        let nozzle = repo
            .register("pump-2", FuelType::Cng, Volume::zero())
            .await
            .unwrap();

        repo.set_active(&nozzle.id, false).await.unwrap();
        assert!(!repo.get_by_id(&nozzle.id).await.unwrap().unwrap().active);

        let missing = repo.set_active("no-such-nozzle", true).await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_by_pump_orders_active_first() {
        let db = test_db().await;
        let repo = db.nozzles();

        let a = repo
            .register("pump-3", FuelType::Petrol, Volume::zero())
            .await
            .unwrap();
        let b = repo
            .register("pump-3", FuelType::Diesel, Volume::zero())
            .await
            .unwrap();
        repo.register("pump-4", FuelType::Petrol, Volume::zero())
            .await
            .unwrap();

        repo.set_active(&a.id, false).await.unwrap();

        let listed = repo.list_by_pump("pump-3").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b.id);
        assert_eq!(listed[1].id, a.id);
    }
}
