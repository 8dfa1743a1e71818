//! # Sale Service
//!
//! Posts and voids fuel sales.
//!
//! ## Posting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      create_sale transaction                            │
//! │                                                                         │
//! │  1. lock nozzle row (touch write)        ── serializes per nozzle      │
//! │  2. meter must advance                   ── NonMonotonicReading        │
//! │  3. volume = cumulative − previous       ── or explicit override       │
//! │  4. price in effect at recording time    ── NoActivePrice              │
//! │  5. amount = volume × price, rounded     ── once, at multiplication    │
//! │  6. tender split checks out              ── PaymentMismatch            │
//! │  7. post credit, insert sale,            ── all or nothing             │
//! │     advance meter                                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failure at any step rolls the whole transaction back: the meter does
//! not move and no creditor balance changes unless the sale row landed.
//!
//! ## Voiding
//!
//! Voids re-lock the sale row, refuse anything not currently `posted`,
//! refuse days already finalized, unwind the credit posting, and optionally
//! roll the meter back when the sale is still the nozzle's latest.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use forecourt_core::tender::{
    derive_payment_method, validate_external_tender, validate_payment_split,
};
use forecourt_core::validation::{validate_station_id, validate_void_reason};
use forecourt_core::{
    CoreError, CreditLimitBreach, CreditPolicy, PostedSale, RequestContext, Sale, SaleRequest,
    SaleStatus,
};

use crate::error::{DbError, ServiceError, ServiceResult};
use crate::repository::creditor::CreditorRepository;
use crate::repository::fuel_price::FuelPriceRepository;
use crate::repository::nozzle::NozzleRepository;
use crate::repository::reconciliation::ReconciliationRepository;
use crate::repository::sale::SaleRepository;

/// Service for posting and voiding sales.
#[derive(Debug, Clone)]
pub struct SaleService {
    pool: SqlitePool,
    credit_policy: CreditPolicy,
}

impl SaleService {
    /// Creates a new SaleService with the given credit-limit policy.
    pub fn new(pool: SqlitePool, credit_policy: CreditPolicy) -> Self {
        SaleService {
            pool,
            credit_policy,
        }
    }

    /// Posts a sale.
    ///
    /// Everything the sale touches moves in one transaction: the sale row,
    /// the nozzle meter and, for credit sales, the creditor's running
    /// balance. The nozzle lock in step one is the serialization point, so
    /// two attendants posting against the same nozzle cannot interleave
    /// their reading pairs.
    pub async fn create_sale(
        &self,
        ctx: &RequestContext,
        request: SaleRequest,
    ) -> ServiceResult<PostedSale> {
        validate_station_id(&request.station_id).map_err(CoreError::from)?;
        if request.external_tender.is_some() {
            validate_external_tender(request.cash_received, request.credit_given)?;
        }

        let now = Utc::now();
        let business_date = now.date_naive();

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let nozzle = NozzleRepository::lock(&mut tx, &request.nozzle_id)
            .await?
            .filter(|n| n.active)
            .ok_or_else(|| ServiceError::NozzleNotFound {
                nozzle_id: request.nozzle_id.clone(),
            })?;

        nozzle.validate_advance(request.cumulative_reading)?;

        let previous = nozzle.current_reading();
        let sale_volume = request
            .explicit_volume
            .unwrap_or(request.cumulative_reading - previous);
        if !sale_volume.is_positive() {
            return Err(CoreError::NonPositiveVolume {
                volume: sale_volume,
            }
            .into());
        }

        let price = FuelPriceRepository::price_in_effect(
            &mut tx,
            &request.station_id,
            nozzle.fuel_type,
            now,
        )
        .await?
        .ok_or_else(|| ServiceError::NoActivePrice {
            station_id: request.station_id.clone(),
            fuel_type: nozzle.fuel_type,
        })?;

        let amount = sale_volume.amount_at(price.price_per_litre());

        // External tenders settle off the till, so the split does not apply
        // and no credit party can be involved.
        let (payment_method, credit_party_id) = match request.external_tender {
            Some(tender) => (tender.into(), None),
            None => {
                validate_payment_split(
                    amount,
                    request.cash_received,
                    request.credit_given,
                    request.credit_party_id.as_deref(),
                )?;
                (
                    derive_payment_method(request.cash_received, request.credit_given),
                    request.credit_party_id.clone(),
                )
            }
        };

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            station_id: request.station_id.clone(),
            nozzle_id: nozzle.id.clone(),
            user_id: ctx.user_id.clone(),
            fuel_type: nozzle.fuel_type,
            previous_reading_cl: previous.centilitres(),
            cumulative_reading_cl: request.cumulative_reading.centilitres(),
            sale_volume_cl: sale_volume.centilitres(),
            price_per_litre_paise: price.price_per_litre_paise,
            amount_paise: amount.paise(),
            cash_received_paise: request.cash_received.paise(),
            credit_given_paise: request.credit_given.paise(),
            credit_party_id,
            payment_method,
            status: SaleStatus::Posted,
            voided_by: None,
            voided_at: None,
            void_reason: None,
            notes: request.notes.clone(),
            recorded_at: now,
            business_date,
        };

        // The credit leg posts before the sale row goes in, so an unknown
        // or inactive party surfaces as CreditorNotFound rather than a
        // foreign-key error off the insert.
        let mut credit_warning = None;
        if sale.credit_given().is_positive() {
            let party_id = match sale.credit_party_id.as_deref() {
                Some(id) => id,
                None => return Err(CoreError::CreditPartyRequired.into()),
            };

            let creditor =
                CreditorRepository::apply_credit(&mut tx, party_id, sale.credit_given(), now)
                    .await?
                    .ok_or_else(|| ServiceError::CreditorNotFound {
                        creditor_id: party_id.to_string(),
                    })?;

            if creditor.over_limit() {
                match self.credit_policy {
                    CreditPolicy::Reject => {
                        let running_balance = creditor.running_balance();
                        let credit_limit = creditor.credit_limit();
                        return Err(CoreError::CreditLimitExceeded {
                            creditor_id: creditor.id,
                            running_balance,
                            credit_limit,
                        }
                        .into());
                    }
                    CreditPolicy::Warn => {
                        warn!(
                            creditor_id = %creditor.id,
                            party_name = %creditor.party_name,
                            running_balance_paise = creditor.running_balance_paise,
                            credit_limit_paise = creditor.credit_limit_paise,
                            "Credit sale posted past the party's limit"
                        );
                        credit_warning = Some(CreditLimitBreach {
                            creditor_id: creditor.id,
                            party_name: creditor.party_name,
                            running_balance_paise: creditor.running_balance_paise,
                            credit_limit_paise: creditor.credit_limit_paise,
                        });
                    }
                }
            }
        }

        SaleRepository::insert(&mut tx, &sale).await?;
        NozzleRepository::advance(&mut tx, &nozzle.id, request.cumulative_reading, now).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %sale.id,
            station_id = %sale.station_id,
            nozzle_id = %sale.nozzle_id,
            volume = %sale.sale_volume(),
            amount = %sale.amount(),
            payment_method = ?sale.payment_method,
            "Sale posted"
        );

        Ok(PostedSale {
            sale,
            credit_warning,
        })
    }

    /// Voids a posted sale.
    ///
    /// The sale keeps its row and reading pair for the audit trail; only
    /// the status and void metadata change. Credit sales get their amount
    /// reversed off the party's balance. With `rollback_meter` the nozzle
    /// reading returns to the sale's previous value, allowed only while no
    /// later sale has recorded on that nozzle.
    pub async fn void_sale(
        &self,
        ctx: &RequestContext,
        sale_id: &str,
        reason: &str,
        rollback_meter: bool,
    ) -> ServiceResult<Sale> {
        validate_void_reason(reason).map_err(CoreError::from)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let sale = SaleRepository::lock(&mut tx, sale_id)
            .await?
            .ok_or_else(|| ServiceError::SaleNotFound {
                sale_id: sale_id.to_string(),
            })?;

        match sale.status {
            SaleStatus::Voided => {
                return Err(ServiceError::AlreadyVoided {
                    sale_id: sale_id.to_string(),
                })
            }
            SaleStatus::Locked => {
                return Err(ServiceError::ReconciliationLocked {
                    station_id: sale.station_id,
                    business_date: sale.business_date,
                })
            }
            SaleStatus::Posted => {}
        }

        // A sale posted after its day finalized is still `posted`; the
        // day-level flag decides, not just the row status.
        if ReconciliationRepository::is_finalized(&mut tx, &sale.station_id, sale.business_date)
            .await?
        {
            return Err(ServiceError::ReconciliationLocked {
                station_id: sale.station_id,
                business_date: sale.business_date,
            });
        }

        if rollback_meter {
            let has_later =
                SaleRepository::has_later_sale(&mut tx, &sale.nozzle_id, &sale.id, sale.recorded_at)
                    .await?;
            if has_later {
                return Err(ServiceError::OutOfOrderVoid {
                    sale_id: sale.id,
                    nozzle_id: sale.nozzle_id,
                });
            }
            NozzleRepository::set_reading(&mut tx, &sale.nozzle_id, sale.previous_reading(), now)
                .await?;
        }

        SaleRepository::mark_voided(&mut tx, &sale.id, &ctx.user_id, reason, now).await?;

        if sale.credit_given().is_positive() {
            if let Some(party_id) = sale.credit_party_id.as_deref() {
                CreditorRepository::reverse_credit(&mut tx, party_id, sale.credit_given(), now)
                    .await?
                    .ok_or_else(|| ServiceError::CreditorNotFound {
                        creditor_id: party_id.to_string(),
                    })?;
            }
        }

        let voided = SaleRepository::get(&mut tx, sale_id)
            .await?
            .ok_or_else(|| ServiceError::SaleNotFound {
                sale_id: sale_id.to_string(),
            })?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %voided.id,
            voided_by = %ctx.user_id,
            rollback_meter,
            "Sale voided"
        );

        Ok(voided)
    }

    /// Gets a sale by ID.
    pub async fn get_sale(&self, sale_id: &str) -> ServiceResult<Sale> {
        SaleRepository::new(self.pool.clone())
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| ServiceError::SaleNotFound {
                sale_id: sale_id.to_string(),
            })
    }

    /// Lists a station-day's sales, all statuses, newest first.
    pub async fn list_for_day(
        &self,
        station_id: &str,
        business_date: NaiveDate,
    ) -> ServiceResult<Vec<Sale>> {
        validate_station_id(station_id).map_err(CoreError::from)?;
        let sales = SaleRepository::new(self.pool.clone())
            .list_for_day(station_id, business_date)
            .await?;
        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
