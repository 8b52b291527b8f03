//! # vendora-db: Database Layer for Vendora
//!
//! This crate provides ledger storage for the Vendora settlement engine.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Vendora Data Flow                                 │
//! │                                                                         │
//! │  vendora-engine (split order / run payout batch)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    vendora-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (sub_order.rs, │    │  (embedded)  │  │   │
//! │  │   │               │    │  earnings.rs,  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  payout.rs,    │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FK on   │    │  settings.rs)  │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite ledger (sub_orders, earnings_records, payouts, settings)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types (kind-classified, never string-matched)
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vendora_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/ledger.db")).await?;
//! let summary = db.earnings().seller_summary("seller-1", Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::earnings::{EarningsRepository, SellerAggregate, SellerEarningsSummary};
pub use repository::payout::PayoutRepository;
pub use repository::settings::SettingsRepository;
pub use repository::sub_order::SubOrderRepository;
