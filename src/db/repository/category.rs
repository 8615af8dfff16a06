//! Category Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const CATEGORY_TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY name")
            .await?
            .take(0)?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let rid = parse_id(CATEGORY_TABLE, id)?;
        let category: Option<Category> = self.base.db().select(rid).await?;
        Ok(category)
    }

    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE category SET
                    name = $name,
                    description = $description,
                    created_at = time::now()
                RETURN AFTER"#,
            )
            .bind(("name", data.name.clone()))
            .bind(("description", data.description.unwrap_or_default()))
            .await?;

        let created: Vec<Category> = result.take(0).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("category_name") {
                RepoError::Duplicate(format!("Category '{}' already exists", data.name))
            } else {
                RepoError::Database(msg)
            }
        })?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let rid = parse_id(CATEGORY_TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Category {}", id)));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }

        let categories: Vec<Category> = query.await?.take(0)?;
        categories
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Category {}", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(CATEGORY_TABLE, id)?;
        let deleted: Option<Category> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Category {}", id)));
        }
        Ok(())
    }
}
