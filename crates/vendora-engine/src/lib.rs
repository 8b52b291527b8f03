//! # vendora-engine: Settlement Orchestration for Vendora
//!
//! The layer the order-processing pipeline calls into. It wires the pure
//! rules from `vendora-core` to the ledger in `vendora-db` and to the two
//! external collaborators (catalog, notifications).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Vendora Settlement Architecture                     │
//! │                                                                         │
//! │  payment captured ─────────────┐      payout cron / admin ──────┐      │
//! │                                ▼                                 ▼      │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              ★ vendora-engine (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐          ┌────────────────────┐           │   │
//! │  │   │  OrderSplitter │          │  PayoutScheduler   │           │   │
//! │  │   │  split()       │          │  run_batch()       │           │   │
//! │  │   │  confirm_*()   │          │  approve/complete/ │           │   │
//! │  │   └───────┬────────┘          │  fail()            │           │   │
//! │  │           │                   └─────────┬──────────┘           │   │
//! │  │           │     ┌──────────────┐        │                      │   │
//! │  │           ├────►│ dyn Catalog  │        │                      │   │
//! │  │           │     │ Service      │        │                      │   │
//! │  │           │     └──────────────┘        │                      │   │
//! │  │           │     ┌──────────────┐        │                      │   │
//! │  │           └────►│ dyn Notifi-  │◄───────┤ (post-commit only)   │   │
//! │  │                 │ cationGateway│        │                      │   │
//! │  │                 └──────────────┘        │                      │   │
//! │  └───────────┬──────────────────────────────┬─────────────────────┘   │
//! │              ▼                              ▼                          │
//! │        vendora-core (rules)           vendora-db (SQLite ledger)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Ownership
//! Repositories never open transactions; this crate does. Each split and
//! each per-seller payout claim is exactly one transaction, and seller
//! notifications go out only after it commits.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod scheduler;
pub mod splitter;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{CatalogError, CatalogService, ResolvedProduct};
pub use error::{EngineError, EngineResult};
pub use gateway::{
    GatewayError, NoopGateway, NotificationGateway, PayoutNotice, SettlementNotice,
};
pub use scheduler::{BatchOutcome, PayoutScheduler};
pub use splitter::{OrderSplitter, SplitResult};
