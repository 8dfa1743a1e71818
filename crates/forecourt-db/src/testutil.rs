//! Shared fixtures for the crate's tests.
//!
//! `test_db` hands each test its own in-memory database, so there is no
//! cross-test state and no cleanup. Tests that need more than one
//! connection build a file-backed `DbConfig` themselves.

use chrono::{Duration, Utc};
use uuid::Uuid;

use forecourt_core::tender::derive_payment_method;
use forecourt_core::{
    Creditor, FuelPrice, FuelType, Money, Nozzle, RequestContext, Role, Sale, SaleStatus, Volume,
};

use crate::pool::{Database, DbConfig};

/// Station id used across the fixtures.
pub const STATION: &str = "stn-karachi-01";

/// Fresh in-memory database with migrations applied.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// Attendant context for posting sales.
pub fn ctx() -> RequestContext {
    RequestContext {
        tenant_id: "tenant-1".to_string(),
        user_id: "op-1".to_string(),
        role: Role::Attendant,
    }
}

/// Manager context for voids and day-close.
pub fn manager_ctx() -> RequestContext {
    RequestContext {
        tenant_id: "tenant-1".to_string(),
        user_id: "mgr-1".to_string(),
        role: Role::Manager,
    }
}

/// Registers a petrol nozzle on pump-1 with the given totalizer reading.
pub async fn seed_nozzle(db: &Database, initial_cl: i64) -> Nozzle {
    db.nozzles()
        .register("pump-1", FuelType::Petrol, Volume::from_centilitres(initial_cl))
        .await
        .expect("seed nozzle")
}

/// Opens a price row effective an hour ago, so it covers "now".
pub async fn seed_price(db: &Database, fuel_type: FuelType, paise_per_litre: i64) -> FuelPrice {
    db.fuel_prices()
        .set_price(
            STATION,
            fuel_type,
            Money::from_paise(paise_per_litre),
            Utc::now() - Duration::hours(1),
        )
        .await
        .expect("seed price")
}

/// Inserts an active creditor with a zero balance.
pub async fn seed_creditor(db: &Database, party_name: &str, limit_paise: i64) -> Creditor {
    let now = Utc::now();
    let creditor = Creditor {
        id: Uuid::new_v4().to_string(),
        station_id: STATION.to_string(),
        party_name: party_name.to_string(),
        phone: None,
        running_balance_paise: 0,
        credit_limit_paise: limit_paise,
        active: true,
        created_at: now,
        updated_at: now,
    };
    db.creditors().insert(&creditor).await.expect("seed creditor");
    creditor
}

/// Builds a posted sale row at Rs 3.20/L for direct repository inserts.
///
/// Leaves `credit_party_id` unset; tests exercising credit set it to a
/// seeded creditor themselves.
pub fn posted_sale_row(
    nozzle: &Nozzle,
    previous_cl: i64,
    cumulative_cl: i64,
    amount_paise: i64,
    cash_paise: i64,
    credit_paise: i64,
) -> Sale {
    let now = Utc::now();
    Sale {
        id: Uuid::new_v4().to_string(),
        station_id: STATION.to_string(),
        nozzle_id: nozzle.id.clone(),
        user_id: "op-1".to_string(),
        fuel_type: nozzle.fuel_type,
        previous_reading_cl: previous_cl,
        cumulative_reading_cl: cumulative_cl,
        sale_volume_cl: cumulative_cl - previous_cl,
        price_per_litre_paise: 320,
        amount_paise,
        cash_received_paise: cash_paise,
        credit_given_paise: credit_paise,
        credit_party_id: None,
        payment_method: derive_payment_method(
            Money::from_paise(cash_paise),
            Money::from_paise(credit_paise),
        ),
        status: SaleStatus::Posted,
        voided_by: None,
        voided_at: None,
        void_reason: None,
        notes: None,
        recorded_at: now,
        business_date: now.date_naive(),
    }
}
