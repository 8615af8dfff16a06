//! Supplier Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Supplier, SupplierCreate, SupplierUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const SUPPLIER_TABLE: &str = "supplier";

#[derive(Clone)]
pub struct SupplierRepository {
    base: BaseRepository,
}

impl SupplierRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Supplier>> {
        let suppliers: Vec<Supplier> = self
            .base
            .db()
            .query("SELECT * FROM supplier ORDER BY name")
            .await?
            .take(0)?;
        Ok(suppliers)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Supplier>> {
        let rid = parse_id(SUPPLIER_TABLE, id)?;
        let supplier: Option<Supplier> = self.base.db().select(rid).await?;
        Ok(supplier)
    }

    pub async fn create(&self, data: SupplierCreate) -> RepoResult<Supplier> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE supplier SET
                    name = $name,
                    email = $email,
                    phone = $phone,
                    address = $address,
                    created_at = time::now()
                RETURN AFTER"#,
            )
            .bind(("name", data.name.clone()))
            .bind(("email", data.email.unwrap_or_default()))
            .bind(("phone", data.phone.unwrap_or_default()))
            .bind(("address", data.address.unwrap_or_default()))
            .await?;

        let created: Vec<Supplier> = result.take(0).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("supplier_name") {
                RepoError::Duplicate(format!("Supplier '{}' already exists", data.name))
            } else {
                RepoError::Database(msg)
            }
        })?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create supplier".to_string()))
    }

    pub async fn update(&self, id: &str, data: SupplierUpdate) -> RepoResult<Supplier> {
        let rid = parse_id(SUPPLIER_TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.email.is_some() {
            set_parts.push("email = $email");
        }
        if data.phone.is_some() {
            set_parts.push("phone = $phone");
        }
        if data.address.is_some() {
            set_parts.push("address = $address");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Supplier {}", id)));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.email {
            query = query.bind(("email", v));
        }
        if let Some(v) = data.phone {
            query = query.bind(("phone", v));
        }
        if let Some(v) = data.address {
            query = query.bind(("address", v));
        }

        let suppliers: Vec<Supplier> = query.await?.take(0)?;
        suppliers
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Supplier {}", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(SUPPLIER_TABLE, id)?;
        let deleted: Option<Supplier> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Supplier {}", id)));
        }
        Ok(())
    }
}
