//! # Repository Module
//!
//! Database repository implementations for Forecourt.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Kinds of Entry Points                            │
//! │                                                                         │
//! │  Pool methods (&self)              Transaction functions (conn)        │
//! │  ──────────────────────            ─────────────────────────────       │
//! │  db.nozzles().get_by_id(id)        NozzleRepository::lock(&mut tx, id) │
//! │  db.sales().list_for_day(..)       SaleRepository::insert(&mut tx, ..) │
//! │                                                                         │
//! │  Single-statement reads and        Steps of a service transaction      │
//! │  self-contained writes run         script run against the caller's     │
//! │  straight off the pool.            open transaction, so the whole      │
//! │                                    sale/void/finalize commits or       │
//! │                                    rolls back as one unit.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQL lives only in this module. Domain rules live in forecourt-core; the
//! service layer stitches the two together.
//!
//! ## Available Repositories
//!
//! - [`fuel_price::FuelPriceRepository`] - Price interval registry
//! - [`nozzle::NozzleRepository`] - Meter tracking and registration
//! - [`sale::SaleRepository`] - Sale rows and day aggregation
//! - [`creditor::CreditorRepository`] - Balances and payment receipts
//! - [`reconciliation::ReconciliationRepository`] - Day-close records

pub mod creditor;
pub mod fuel_price;
pub mod nozzle;
pub mod reconciliation;
pub mod sale;
