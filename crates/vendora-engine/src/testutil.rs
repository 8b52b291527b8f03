//! Shared test fixtures: an in-memory ledger, a catalog fixture, and a
//! notification gateway that records everything it is handed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::{CatalogError, CatalogService, ResolvedProduct};
use crate::gateway::{GatewayError, NotificationGateway, PayoutNotice, SettlementNotice};
use vendora_core::OrderLine;
use vendora_db::{Database, DbConfig};

/// Fresh in-memory ledger with migrations applied.
///
/// Also installs a test tracing subscriber once, so `RUST_LOG=debug cargo
/// test` shows the engine's structured logs per test.
pub async fn test_db() -> Database {
    init_logging();
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Order line shorthand.
pub fn line(product_id: &str, unit_price_cents: i64, quantity: i64) -> OrderLine {
    OrderLine {
        product_id: product_id.to_string(),
        unit_price_cents,
        quantity,
    }
}

/// In-memory catalog. Unknown ids are omitted from responses, matching the
/// resolution contract; `unavailable()` simulates an outage.
pub struct FixtureCatalog {
    products: HashMap<String, ResolvedProduct>,
    outage: bool,
}

impl FixtureCatalog {
    pub fn new() -> Self {
        FixtureCatalog {
            products: HashMap::new(),
            outage: false,
        }
    }

    pub fn unavailable() -> Self {
        FixtureCatalog {
            products: HashMap::new(),
            outage: true,
        }
    }

    pub fn with_product(
        mut self,
        product_id: &str,
        seller_id: &str,
        category_id: Option<&str>,
    ) -> Self {
        self.products.insert(
            product_id.to_string(),
            ResolvedProduct {
                product_id: product_id.to_string(),
                seller_id: seller_id.to_string(),
                category_id: category_id.map(str::to_string),
                title: format!("Product {product_id}"),
                sku: format!("SKU-{product_id}"),
            },
        );
        self
    }
}

#[async_trait]
impl CatalogService for FixtureCatalog {
    async fn resolve_products(
        &self,
        product_ids: &[String],
    ) -> Result<Vec<ResolvedProduct>, CatalogError> {
        if self.outage {
            return Err(CatalogError::Unavailable("fixture outage".to_string()));
        }
        Ok(product_ids
            .iter()
            .filter_map(|id| self.products.get(id).cloned())
            .collect())
    }
}

/// Gateway that records every notice for assertions.
#[derive(Default)]
pub struct RecordingGateway {
    pub settlements: Mutex<Vec<SettlementNotice>>,
    pub payouts: Mutex<Vec<PayoutNotice>>,
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn settlement_created(&self, notice: &SettlementNotice) -> Result<(), GatewayError> {
        self.settlements.lock().unwrap().push(notice.clone());
        Ok(())
    }

    async fn payout_created(&self, notice: &PayoutNotice) -> Result<(), GatewayError> {
        self.payouts.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
