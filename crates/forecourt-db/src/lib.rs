//! # forecourt-db: Storage and Services for Forecourt
//!
//! This crate provides database access and the transactional services for
//! the forecourt sales system. It uses SQLite for station-local storage
//! with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Forecourt Data Flow                                │
//! │                                                                         │
//! │  Till / API handler (create_sale)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   forecourt-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │   Database   │  │   │
//! │  │   │ (service/)    │    │ (repository/) │    │  (pool.rs)   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SaleService   │───►│ SaleRepo      │───►│ SqlitePool   │  │   │
//! │  │   │ ReconService  │    │ NozzleRepo    │    │ WAL mode     │  │   │
//! │  │   │ CreditorSvc   │    │ CreditorRepo  │    │ migrations   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │              /var/lib/forecourt/station.db                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Storage-only row operations
//! - [`service`] - Validated, transactional business operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use forecourt_core::CreditPolicy;
//! use forecourt_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/station.db");
//! let db = Database::new(config).await?;
//!
//! let sales = db.sale_service(CreditPolicy::Warn);
//! let posted = sales.create_sale(&ctx, request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::creditor::CreditorRepository;
pub use repository::fuel_price::FuelPriceRepository;
pub use repository::nozzle::NozzleRepository;
pub use repository::reconciliation::ReconciliationRepository;
pub use repository::sale::SaleRepository;

// Service re-exports
pub use service::creditor::CreditorService;
pub use service::reconciliation::ReconciliationService;
pub use service::sale::SaleService;
