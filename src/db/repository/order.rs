//! Order Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Order, OrderStatus, StatusBucket};
use chrono::{DateTime, Utc};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

// "order" is a SurrealQL keyword, so the table is named "orders"
const ORDER_TABLE: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn parse_order_id(id: &str) -> RepoResult<RecordId> {
        parse_id(ORDER_TABLE, id)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders ORDER BY ordered_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_by_owner(&self, owner: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders WHERE owner = $owner ORDER BY ordered_at DESC")
            .bind(("owner", owner.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_by_status(
        &self,
        status: OrderStatus,
        owner: Option<&RecordId>,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = match owner {
            Some(owner) => {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM orders WHERE status = $status AND owner = $owner \
                         ORDER BY ordered_at DESC",
                    )
                    .bind(("status", status))
                    .bind(("owner", owner.clone()))
                    .await?
                    .take(0)?
            }
            None => {
                self.base
                    .db()
                    .query("SELECT * FROM orders WHERE status = $status ORDER BY ordered_at DESC")
                    .bind(("status", status))
                    .await?
                    .take(0)?
            }
        };
        Ok(orders)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = parse_id(ORDER_TABLE, id)?;
        let order: Option<Order> = self.base.db().select(rid).await?;
        Ok(order)
    }

    /// Count of orders in a given status (derived pending-order reminders)
    pub async fn count_by_status(&self, status: OrderStatus) -> RepoResult<i64> {
        #[derive(serde::Deserialize)]
        struct Count {
            count: i64,
        }

        let mut result = self
            .base
            .db()
            .query("SELECT count() AS count FROM orders WHERE status = $status GROUP ALL")
            .bind(("status", status))
            .await?;
        let count: Option<Count> = result.take(0)?;
        Ok(count.map(|c| c.count).unwrap_or(0))
    }

    /// Persist a freshly placed order (always Pending)
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        product: RecordId,
        quantity: i64,
        customer_name: String,
        owner: RecordId,
        priority: crate::db::models::OrderPriority,
        notes: Option<String>,
        total_amount: f64,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE orders SET
                    product = $product,
                    quantity = $quantity,
                    customer_name = $customer_name,
                    owner = $owner,
                    status = 'Pending',
                    priority = $priority,
                    notes = $notes,
                    total_amount = $total_amount,
                    ordered_at = time::now(),
                    approved_by = NONE,
                    approved_at = NONE,
                    rejection_reason = NONE,
                    estimated_delivery = NONE
                RETURN AFTER"#,
            )
            .bind(("product", product))
            .bind(("quantity", quantity))
            .bind(("customer_name", customer_name))
            .bind(("owner", owner))
            .bind(("priority", priority))
            .bind(("notes", notes))
            .bind(("total_amount", total_amount))
            .await?;

        let created: Option<Order> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Update the editable fields of a Pending order
    pub async fn update_fields(
        &self,
        id: &str,
        quantity: Option<i64>,
        priority: Option<crate::db::models::OrderPriority>,
        notes: Option<String>,
        total_amount: Option<f64>,
    ) -> RepoResult<Order> {
        let rid = parse_id(ORDER_TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if quantity.is_some() {
            set_parts.push("quantity = $quantity");
        }
        if priority.is_some() {
            set_parts.push("priority = $priority");
        }
        if notes.is_some() {
            set_parts.push("notes = $notes");
        }
        if total_amount.is_some() {
            set_parts.push("total_amount = $total_amount");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Order {}", id)));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));
        if let Some(v) = quantity {
            query = query.bind(("quantity", v));
        }
        if let Some(v) = priority {
            query = query.bind(("priority", v));
        }
        if let Some(v) = notes {
            query = query.bind(("notes", v));
        }
        if let Some(v) = total_amount {
            query = query.bind(("total_amount", v));
        }

        let orders: Vec<Order> = query.await?.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", id)))
    }

    /// Write a status transition with its bookkeeping fields
    pub async fn set_status(
        &self,
        id: &str,
        status: OrderStatus,
        approved_by: Option<RecordId>,
        rejection_reason: Option<String>,
        estimated_delivery: Option<DateTime<Utc>>,
    ) -> RepoResult<Order> {
        let rid = parse_id(ORDER_TABLE, id)?;

        let mut set_parts = vec!["status = $status"];
        if approved_by.is_some() {
            set_parts.push("approved_by = $approved_by");
            set_parts.push("approved_at = time::now()");
        }
        if rejection_reason.is_some() {
            set_parts.push("rejection_reason = $rejection_reason");
        }
        if estimated_delivery.is_some() {
            set_parts.push("estimated_delivery = $estimated_delivery");
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self
            .base
            .db()
            .query(query_str)
            .bind(("id", rid))
            .bind(("status", status));
        if let Some(v) = approved_by {
            query = query.bind(("approved_by", v));
        }
        if let Some(v) = rejection_reason {
            query = query.bind(("rejection_reason", v));
        }
        if let Some(v) = estimated_delivery {
            query = query.bind(("estimated_delivery", surrealdb::sql::Datetime::from(v)));
        }

        let orders: Vec<Order> = query.await?.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(ORDER_TABLE, id)?;
        let deleted: Option<Order> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Order {}", id)));
        }
        Ok(())
    }

    /// Count and summed total grouped by status, optionally scoped to one
    /// owner
    pub async fn stats(&self, owner: Option<&RecordId>) -> RepoResult<Vec<StatusBucket>> {
        let buckets: Vec<StatusBucket> = match owner {
            Some(owner) => {
                self.base
                    .db()
                    .query(
                        "SELECT status, count() AS count, math::sum(total_amount) AS total \
                         FROM orders WHERE owner = $owner GROUP BY status",
                    )
                    .bind(("owner", owner.clone()))
                    .await?
                    .take(0)?
            }
            None => {
                self.base
                    .db()
                    .query(
                        "SELECT status, count() AS count, math::sum(total_amount) AS total \
                         FROM orders GROUP BY status",
                    )
                    .await?
                    .take(0)?
            }
        };
        Ok(buckets)
    }
}
