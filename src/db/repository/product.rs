//! Product Repository
//!
//! Holds the one storage-level primitive the order path depends on:
//! [`ProductRepository::try_reserve_stock`], a conditional decrement executed
//! as a single statement so two concurrent approvals cannot both pass the
//! availability check.

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{DEFAULT_LOW_STOCK_THRESHOLD, Product, ProductCreate, ProductUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = parse_id(PRODUCT_TABLE, id)?;
        let product: Option<Product> = self.base.db().select(rid).await?;
        Ok(product)
    }

    /// Products at or below their low-stock threshold
    pub async fn find_low_stock(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE quantity <= low_stock_threshold ORDER BY quantity")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let category = parse_id("category", &data.category)?;
        let supplier = parse_id("supplier", &data.supplier)?;

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product SET
                    name = $name,
                    category = $category,
                    supplier = $supplier,
                    price = $price,
                    quantity = $quantity,
                    low_stock_threshold = $low_stock_threshold,
                    description = $description,
                    created_at = time::now()
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("category", category))
            .bind(("supplier", supplier))
            .bind(("price", data.price))
            .bind(("quantity", data.quantity))
            .bind((
                "low_stock_threshold",
                data.low_stock_threshold
                    .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            ))
            .bind(("description", data.description.unwrap_or_default()))
            .await?;

        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let rid = parse_id(PRODUCT_TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.supplier.is_some() {
            set_parts.push("supplier = $supplier");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.quantity.is_some() {
            set_parts.push("quantity = $quantity");
        }
        if data.low_stock_threshold.is_some() {
            set_parts.push("low_stock_threshold = $low_stock_threshold");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {}", id)));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", parse_id("category", &v)?));
        }
        if let Some(v) = data.supplier {
            query = query.bind(("supplier", parse_id("supplier", &v)?));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.quantity {
            if v < 0 {
                return Err(RepoError::Validation(
                    "quantity cannot be negative".to_string(),
                ));
            }
            query = query.bind(("quantity", v));
        }
        if let Some(v) = data.low_stock_threshold {
            query = query.bind(("low_stock_threshold", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {}", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(PRODUCT_TABLE, id)?;
        let deleted: Option<Product> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Product {}", id)));
        }
        Ok(())
    }

    /// Conditionally take `quantity` units out of stock
    ///
    /// The guard lives inside the UPDATE statement, so the check and the
    /// decrement are one atomic operation: returns `Some(product)` with the
    /// post-decrement state when enough stock was available, `None` when the
    /// guard failed (stock untouched).
    pub async fn try_reserve_stock(&self, id: &str, quantity: i64) -> RepoResult<Option<Product>> {
        let rid = parse_id(PRODUCT_TABLE, id)?;
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "UPDATE product SET quantity -= $qty \
                 WHERE id = $id AND quantity >= $qty RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("qty", quantity))
            .await?
            .take(0)?;
        Ok(products.into_iter().next())
    }

    /// Put `quantity` units back (approved order cancelled or deleted)
    pub async fn restore_stock(&self, id: &str, quantity: i64) -> RepoResult<Product> {
        let rid = parse_id(PRODUCT_TABLE, id)?;
        let products: Vec<Product> = self
            .base
            .db()
            .query("UPDATE $id SET quantity += $qty RETURN AFTER")
            .bind(("id", rid))
            .bind(("qty", quantity))
            .await?
            .take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {}", id)))
    }
}
