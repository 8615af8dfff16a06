//! Database Module
//!
//! Embedded SurrealDB. Production runs on RocksDB under the work dir; tests
//! and dev mode use the in-memory engine.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "stockroom";
const DATABASE: &str = "main";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `path`
    pub async fn new(path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

        let service = Self { db };
        service.select_and_define().await?;
        tracing::info!(path, "Database opened (RocksDB)");
        Ok(service)
    }

    /// In-memory database for tests and dev mode
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

        let service = Self { db };
        service.select_and_define().await?;
        Ok(service)
    }

    async fn select_and_define(&self) -> Result<(), AppError> {
        self.db
            .use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

        self.define_schema().await
    }

    /// Idempotent schema definitions
    ///
    /// SurrealDB is schemaless by default; only the constraints we rely on
    /// are defined here (unique email for login, unique category/supplier
    /// names).
    async fn define_schema(&self) -> Result<(), AppError> {
        self.db
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE;
                DEFINE TABLE IF NOT EXISTS category SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS category_name ON TABLE category COLUMNS name UNIQUE;
                DEFINE TABLE IF NOT EXISTS supplier SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS supplier_name ON TABLE supplier COLUMNS name UNIQUE;
                DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
                DEFINE TABLE IF NOT EXISTS orders SCHEMALESS;
                DEFINE TABLE IF NOT EXISTS notification SCHEMALESS;
                "#,
            )
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?
            .check()
            .map_err(|e| AppError::database(format!("Schema definition rejected: {}", e)))?;

        Ok(())
    }

    /// Seed the default admin account when the user table is empty
    ///
    /// Credentials come from ADMIN_EMAIL / ADMIN_PASSWORD, falling back to
    /// local development defaults.
    pub async fn seed_admin(&self) -> Result<(), AppError> {
        let mut result = self
            .db
            .query("SELECT count() AS count FROM user GROUP ALL")
            .await?;

        #[derive(serde::Deserialize)]
        struct Count {
            count: i64,
        }

        let count: Option<Count> = result.take(0)?;
        if count.map(|c| c.count).unwrap_or(0) > 0 {
            return Ok(());
        }

        let email =
            std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());
        let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        let hash = models::User::hash_password(&password)
            .map_err(|e| AppError::internal(format!("Failed to hash admin password: {}", e)))?;

        self.db
            .query(
                r#"CREATE user SET
                    name = 'Administrator',
                    email = $email,
                    hash_pass = $hash,
                    role = 'admin',
                    is_active = true,
                    created_at = time::now()"#,
            )
            .bind(("email", email.clone()))
            .bind(("hash", hash))
            .await?
            .check()?;

        tracing::info!(email, "Seeded default admin account");
        Ok(())
    }
}
