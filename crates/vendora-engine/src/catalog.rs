//! # Catalog Seam
//!
//! Product resolution boundary between the settlement engine and the catalog
//! system. Order lines carry only a product id; the seller and category a
//! line settles under come from here, batched per order.
//!
//! ## Resolution Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_products(distinct product ids)                                 │
//! │       │                                                                 │
//! │       ├── known products  → returned with seller, category, snapshot   │
//! │       │                     data (sku, title)                           │
//! │       ├── unknown products → simply absent from the response; the      │
//! │       │                     splitter skips those lines with a warning   │
//! │       └── catalog outage   → Err(CatalogError), the whole split fails   │
//! │                             retryably                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog data for one product, as of settlement time.
///
/// `sku` and `title` are frozen into sub-order item snapshots so later
/// catalog edits never rewrite settled history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedProduct {
    pub product_id: String,
    /// The seller this product's revenue settles to.
    pub seller_id: String,
    /// Category used for commission rate resolution, when assigned.
    pub category_id: Option<String>,
    pub title: String,
    pub sku: String,
}

/// Catalog resolution failures.
///
/// An individual unknown product is NOT an error - it is absent from the
/// response. These cover the catalog being unreachable or answering
/// malformed.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be reached or timed out.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog answered with something undecodable.
    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

/// Product resolution service.
///
/// Implemented over the marketplace's catalog store or service; tests inject
/// a fixture.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Resolves a batch of distinct product ids.
    ///
    /// Unknown ids are omitted from the result, not errored.
    async fn resolve_products(
        &self,
        product_ids: &[String],
    ) -> Result<Vec<ResolvedProduct>, CatalogError>;
}
