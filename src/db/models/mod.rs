//! Database Models
//!
//! Serde models and Create/Update payloads for every persisted table.

pub mod category;
pub mod notification;
pub mod order;
pub mod product;
pub mod serde_helpers;
pub mod supplier;
pub mod user;

pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use notification::{
    DerivedKind, DerivedNotification, Notification, NotificationCreate, NotificationEntry,
    NotificationType,
};
pub use order::{
    Order, OrderCreate, OrderPriority, OrderStatus, OrderStatusUpdate, OrderUpdate, StatusBucket,
};
pub use product::{DEFAULT_LOW_STOCK_THRESHOLD, Product, ProductCreate, ProductUpdate};
pub use supplier::{Supplier, SupplierCreate, SupplierUpdate};
pub use user::{Role, User, UserCreate, UserUpdate, UserView};
