//! # Repository Implementations
//!
//! One repository per aggregate. Reads go through the pool held by the
//! repository; writes that must share a transaction (the per-order split,
//! the per-seller payout claim) are associated functions taking a
//! `&mut SqliteConnection`, so the engine owns the transaction boundary.

pub mod earnings;
pub mod payout;
pub mod settings;
pub mod sub_order;
