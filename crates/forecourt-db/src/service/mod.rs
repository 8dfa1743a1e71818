//! # Service Layer
//!
//! Validated orchestration on top of the repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Service Layer                                   │
//! │                                                                         │
//! │  SaleService            posts and voids sales; one transaction per     │
//! │                         operation covering sale row, nozzle meter and  │
//! │                         creditor balance together                      │
//! │                                                                         │
//! │  ReconciliationService  drafts and finalizes day-close records;        │
//! │                         finalize recomputes totals in-transaction and  │
//! │                         locks the day's sales                          │
//! │                                                                         │
//! │  CreditorService        registers credit accounts and records          │
//! │                         payments against their running balances        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Services own input validation and the business rules; repositories stay
//! storage-only. Every multi-row write goes through a single transaction
//! opened here, with the write-locking statement placed first so concurrent
//! operations on the same nozzle, sale or day serialize cleanly.

pub mod creditor;
pub mod reconciliation;
pub mod sale;
