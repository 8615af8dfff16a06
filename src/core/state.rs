use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    CategoryRepository, NotificationRepository, OrderRepository, ProductRepository,
    SupplierRepository, UserRepository,
};
use crate::notifications::NotificationService;
use crate::orders::OrderService;
use crate::realtime::{PresenceTracker, PushHub};
use crate::utils::AppResult;

/// Shared server state
///
/// One instance per process, cloned into every handler and socket loop.
/// All fields are cheap to clone (Arc or Arc-backed).
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    jwt_service: Arc<JwtService>,
    hub: PushHub,
    presence: PresenceTracker,
    orders: OrderService,
    notifications: NotificationService,
}

impl ServerState {
    /// Initialize production state: RocksDB under the work dir, seeded
    /// admin account
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            crate::utils::AppError::internal(format!(
                "Failed to create work dir {}: {}",
                config.work_dir, e
            ))
        })?;

        let db_path = config.database_path();
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;
        db_service.seed_admin().await?;

        Ok(Self::assemble(config.clone(), db_service))
    }

    /// In-memory state for tests; no admin seed
    pub async fn in_memory() -> AppResult<Self> {
        let db_service = DbService::memory().await?;
        Ok(Self::assemble(Config::from_env(), db_service))
    }

    fn assemble(config: Config, db_service: DbService) -> Self {
        let db = db_service.db;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let hub = PushHub::new();
        let presence = PresenceTracker::new();

        let notifications = NotificationService::new(
            NotificationRepository::new(db.clone()),
            ProductRepository::new(db.clone()),
            OrderRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            hub.clone(),
        );
        let orders = OrderService::new(
            OrderRepository::new(db.clone()),
            ProductRepository::new(db.clone()),
            notifications.clone(),
            hub.clone(),
        );

        Self {
            config,
            db,
            jwt_service,
            hub,
            presence,
            orders,
            notifications,
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn hub(&self) -> &PushHub {
        &self.hub
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn order_service(&self) -> &OrderService {
        &self.orders
    }

    pub fn notification_service(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.db.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.db.clone())
    }
}
