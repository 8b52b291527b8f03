//! # Sub-Order Repository
//!
//! Database operations for sub-orders and their item snapshots.
//!
//! ## Sub-Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CREATE (split time, inside the per-order transaction)              │
//! │     └── insert() + insert_item() per line                              │
//! │         subtotal is immutable from here on                             │
//! │                                                                         │
//! │  2. FULFILLMENT UPDATES (external collaborator)                        │
//! │     └── update_fulfillment_status() - never touches money fields       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendora_core::{FulfillmentStatus, SubOrder, SubOrderItem};

/// Repository for sub-order database operations.
#[derive(Debug, Clone)]
pub struct SubOrderRepository {
    pool: SqlitePool,
}

impl SubOrderRepository {
    /// Creates a new SubOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SubOrderRepository { pool }
    }

    /// Inserts a sub-order inside the caller's split transaction.
    pub async fn insert(conn: &mut SqliteConnection, sub_order: &SubOrder) -> DbResult<()> {
        debug!(id = %sub_order.id, order_id = %sub_order.order_id, seller_id = %sub_order.seller_id, "Inserting sub-order");

        sqlx::query(
            r#"
            INSERT INTO sub_orders (
                id, order_id, seller_id, subtotal_cents, item_count,
                fulfillment_status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&sub_order.id)
        .bind(&sub_order.order_id)
        .bind(&sub_order.seller_id)
        .bind(sub_order.subtotal_cents)
        .bind(sub_order.item_count)
        .bind(sub_order.fulfillment_status)
        .bind(sub_order.created_at)
        .bind(sub_order.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts an item snapshot inside the caller's split transaction.
    pub async fn insert_item(conn: &mut SqliteConnection, item: &SubOrderItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sub_order_items (
                id, sub_order_id, product_id, sku_snapshot, title_snapshot,
                unit_price_cents, quantity, line_total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sub_order_id)
        .bind(&item.product_id)
        .bind(&item.sku_snapshot)
        .bind(&item.title_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.line_total_cents)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets a sub-order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SubOrder>> {
        let sub_order = sqlx::query_as::<_, SubOrder>(
            r#"
            SELECT id, order_id, seller_id, subtotal_cents, item_count,
                   fulfillment_status, created_at, updated_at
            FROM sub_orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub_order)
    }

    /// Gets all sub-orders of a parent order, ordered by seller for
    /// deterministic output.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Vec<SubOrder>> {
        let sub_orders = sqlx::query_as::<_, SubOrder>(
            r#"
            SELECT id, order_id, seller_id, subtotal_cents, item_count,
                   fulfillment_status, created_at, updated_at
            FROM sub_orders
            WHERE order_id = ?1
            ORDER BY seller_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sub_orders)
    }

    /// Whether any sub-order exists for an order (idempotency probe).
    pub async fn exists_for_order(&self, order_id: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sub_orders WHERE order_id = ?1")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Gets all item snapshots of a sub-order.
    pub async fn get_items(&self, sub_order_id: &str) -> DbResult<Vec<SubOrderItem>> {
        let items = sqlx::query_as::<_, SubOrderItem>(
            r#"
            SELECT id, sub_order_id, product_id, sku_snapshot, title_snapshot,
                   unit_price_cents, quantity, line_total_cents, created_at
            FROM sub_order_items
            WHERE sub_order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sub_order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates fulfillment status (external collaborator hook).
    ///
    /// Only the status and updated_at change; money fields are untouchable
    /// through this path by construction.
    pub async fn update_fulfillment_status(
        &self,
        id: &str,
        status: FulfillmentStatus,
        now: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE sub_orders SET fulfillment_status = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SubOrder", id));
        }

        Ok(())
    }
}

/// Generates a new sub-order ID.
pub fn generate_sub_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sub-order item ID.
pub fn generate_sub_order_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    fn sample(order_id: &str, seller_id: &str) -> SubOrder {
        let now = Utc::now();
        SubOrder {
            id: generate_sub_order_id(),
            order_id: order_id.to_string(),
            seller_id: seller_id.to_string(),
            subtotal_cents: 6000,
            item_count: 2,
            fulfillment_status: FulfillmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sub_orders();

        let so = sample("order-1", "seller-a");
        let mut conn = db.pool().acquire().await.unwrap();
        SubOrderRepository::insert(&mut conn, &so).await.unwrap();
        drop(conn);

        let fetched = repo.get_by_id(&so.id).await.unwrap().unwrap();
        assert_eq!(fetched.order_id, "order-1");
        assert_eq!(fetched.subtotal_cents, 6000);
        assert_eq!(fetched.fulfillment_status, FulfillmentStatus::Pending);

        assert!(repo.exists_for_order("order-1").await.unwrap());
        assert!(!repo.exists_for_order("order-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_unique_order_seller_pair() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = sample("order-1", "seller-a");
        let second = sample("order-1", "seller-a");

        let mut conn = db.pool().acquire().await.unwrap();
        SubOrderRepository::insert(&mut conn, &first).await.unwrap();
        let err = SubOrderRepository::insert(&mut conn, &second)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_update_fulfillment_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sub_orders();

        let so = sample("order-1", "seller-a");
        let mut conn = db.pool().acquire().await.unwrap();
        SubOrderRepository::insert(&mut conn, &so).await.unwrap();
        drop(conn);

        repo.update_fulfillment_status(&so.id, FulfillmentStatus::Shipped, Utc::now())
            .await
            .unwrap();

        let fetched = repo.get_by_id(&so.id).await.unwrap().unwrap();
        assert_eq!(fetched.fulfillment_status, FulfillmentStatus::Shipped);

        let err = repo
            .update_fulfillment_status("missing", FulfillmentStatus::Shipped, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_items_snapshot() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sub_orders();

        let so = sample("order-1", "seller-a");
        let item = SubOrderItem {
            id: generate_sub_order_item_id(),
            sub_order_id: so.id.clone(),
            product_id: "prod-1".to_string(),
            sku_snapshot: "SKU-1".to_string(),
            title_snapshot: "Widget".to_string(),
            unit_price_cents: 3000,
            quantity: 2,
            line_total_cents: 6000,
            created_at: Utc::now(),
        };

        let mut conn = db.pool().acquire().await.unwrap();
        SubOrderRepository::insert(&mut conn, &so).await.unwrap();
        SubOrderRepository::insert_item(&mut conn, &item).await.unwrap();
        drop(conn);

        let items = repo.get_items(&so.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sku_snapshot, "SKU-1");
        assert_eq!(items[0].line_total_cents, 6000);
    }
}
