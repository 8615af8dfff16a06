//! Order Lifecycle Manager
//!
//! Owns every status transition and its inventory side effect:
//!
//! - placing an order is a soft availability check only; stock moves at
//!   approval time
//! - Pending → Approved reserves stock through an atomic conditional
//!   decrement, so two approvals racing over the same depleted product
//!   cannot both succeed
//! - cancelling or deleting a previously Approved order puts the stock back
//!
//! Stock changes are broadcast over the push hub; interested parties also
//! get persisted notifications.

use crate::auth::CurrentUser;
use crate::db::models::{
    NotificationType, Order, OrderCreate, OrderStatus, OrderStatusUpdate, OrderUpdate, Product,
    StatusBucket,
};
use crate::db::repository::{OrderRepository, ProductRepository, parse_id};
use crate::notifications::NotificationService;
use crate::realtime::{PushHub, ServerEvent};
use crate::utils::{AppError, AppResult};
use surrealdb::RecordId;

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    products: ProductRepository,
    notifications: NotificationService,
    hub: PushHub,
}

impl OrderService {
    pub fn new(
        orders: OrderRepository,
        products: ProductRepository,
        notifications: NotificationService,
        hub: PushHub,
    ) -> Self {
        Self {
            orders,
            products,
            notifications,
            hub,
        }
    }

    fn actor_rid(actor: &CurrentUser) -> AppResult<RecordId> {
        parse_id("user", &actor.id)
            .map_err(|_| AppError::internal(format!("Malformed actor id: {}", actor.id)))
    }

    /// Orders visible to the actor: everything for admins, own orders
    /// otherwise
    pub async fn list(&self, actor: &CurrentUser) -> AppResult<Vec<Order>> {
        if actor.is_admin() {
            Ok(self.orders.find_all().await?)
        } else {
            let owner = Self::actor_rid(actor)?;
            Ok(self.orders.find_by_owner(&owner).await?)
        }
    }

    pub async fn list_by_status(
        &self,
        actor: &CurrentUser,
        status: OrderStatus,
    ) -> AppResult<Vec<Order>> {
        let owner = if actor.is_admin() {
            None
        } else {
            Some(Self::actor_rid(actor)?)
        };
        Ok(self.orders.find_by_status(status, owner.as_ref()).await?)
    }

    pub async fn get(&self, actor: &CurrentUser, id: &str) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

        if !actor.is_admin() && !actor.owns(&order.owner) {
            return Err(AppError::forbidden("You do not have access to this order"));
        }
        Ok(order)
    }

    /// Place a new order
    ///
    /// Availability is a soft check; the stock decrement happens at
    /// approval. Every admin gets an `order_placed` notification.
    pub async fn place(&self, actor: &CurrentUser, data: OrderCreate) -> AppResult<Order> {
        let product = self
            .products
            .find_by_id(&data.product)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {}", data.product)))?;

        if product.quantity < data.quantity {
            return Err(AppError::conflict(format!(
                "Insufficient stock for {}: {} requested, {} available",
                product.name, data.quantity, product.quantity
            )));
        }

        let product_rid = product
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Product record missing id"))?;
        let owner = Self::actor_rid(actor)?;
        let total_amount = product.price * data.quantity as f64;

        let order = self
            .orders
            .create(
                product_rid,
                data.quantity,
                data.customer_name,
                owner.clone(),
                data.priority,
                data.notes,
                total_amount,
            )
            .await?;

        let message = format!(
            "{} placed an order for {} x{}",
            actor.name, product.name, data.quantity
        );
        if let Err(e) = self
            .notifications
            .notify_admins(owner, NotificationType::OrderPlaced, message)
            .await
        {
            tracing::warn!(error = %e, "failed to create order_placed notifications");
        }

        Ok(order)
    }

    /// Transition an order to a new status
    ///
    /// The transition table is the single source of truth; anything it does
    /// not allow is a Conflict. Non-admins may only act on their own orders,
    /// and privileged target statuses are admin-only.
    pub async fn update_status(
        &self,
        actor: &CurrentUser,
        id: &str,
        data: OrderStatusUpdate,
    ) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

        if !actor.is_admin() && !actor.owns(&order.owner) {
            return Err(AppError::forbidden("You do not have access to this order"));
        }

        let next = data.status;
        if !actor.is_admin() && next.is_privileged() {
            return Err(AppError::forbidden(format!(
                "Only admins may set status {}",
                next.as_str()
            )));
        }
        if !order.status.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Cannot transition order from {} to {}",
                order.status.as_str(),
                next.as_str()
            )));
        }

        let mut approved_by = None;
        match next {
            OrderStatus::Approved => {
                self.reserve_for(&order).await?;
                approved_by = Some(Self::actor_rid(actor)?);
            }
            OrderStatus::Cancelled if order.status == OrderStatus::Approved => {
                self.restore_for(&order).await?;
            }
            _ => {}
        }

        let rejection_reason = if next == OrderStatus::Rejected {
            data.rejection_reason
        } else {
            None
        };

        let updated = self
            .orders
            .set_status(id, next, approved_by, rejection_reason, data.estimated_delivery)
            .await?;

        // Owners acting on their own order need no notification
        if !actor.owns(&updated.owner) {
            let message = format!(
                "Order for {} is now {}",
                updated.customer_name,
                next.as_str()
            );
            if let Err(e) = self
                .notifications
                .create(
                    updated.owner.clone(),
                    Self::actor_rid(actor)?,
                    NotificationType::OrderStatusUpdate,
                    message,
                )
                .await
            {
                tracing::warn!(error = %e, "failed to create order_status_update notification");
            }
        }

        Ok(updated)
    }

    /// Edit the mutable fields of a Pending order
    ///
    /// A quantity change re-checks availability and recomputes the frozen
    /// total.
    pub async fn update_fields(
        &self,
        actor: &CurrentUser,
        id: &str,
        data: OrderUpdate,
    ) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

        if !actor.is_admin() && !actor.owns(&order.owner) {
            return Err(AppError::forbidden("You may only edit your own orders"));
        }
        if order.status != OrderStatus::Pending {
            return Err(AppError::conflict(format!(
                "Only pending orders can be edited (current status: {})",
                order.status.as_str()
            )));
        }

        let mut total_amount = None;
        if let Some(quantity) = data.quantity {
            if quantity < 1 {
                return Err(AppError::validation("quantity must be at least 1"));
            }
            let product = self
                .products
                .find_by_id(&order.product.to_string())
                .await?
                .ok_or_else(|| AppError::not_found(format!("Product {}", order.product)))?;
            if product.quantity < quantity {
                return Err(AppError::conflict(format!(
                    "Insufficient stock for {}: {} requested, {} available",
                    product.name, quantity, product.quantity
                )));
            }
            total_amount = Some(product.price * quantity as f64);
        }

        let updated = self
            .orders
            .update_fields(id, data.quantity, data.priority, data.notes, total_amount)
            .await?;
        Ok(updated)
    }

    /// Cancel an order, returning reserved stock if it was Approved
    pub async fn cancel(&self, actor: &CurrentUser, id: &str) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

        if !actor.is_admin() && !actor.owns(&order.owner) {
            return Err(AppError::forbidden("You may only cancel your own orders"));
        }
        if !order.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(AppError::conflict(format!(
                "Cannot cancel an order in status {}",
                order.status.as_str()
            )));
        }

        if order.status == OrderStatus::Approved {
            self.restore_for(&order).await?;
        }

        let updated = self
            .orders
            .set_status(id, OrderStatus::Cancelled, None, None, None)
            .await?;
        Ok(updated)
    }

    /// Permanently remove an order (admin only), returning stock first when
    /// it was Approved
    pub async fn delete(&self, actor: &CurrentUser, id: &str) -> AppResult<()> {
        if !actor.is_admin() {
            return Err(AppError::forbidden("Only admins may delete orders"));
        }

        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

        if order.status == OrderStatus::Approved {
            self.restore_for(&order).await?;
        }

        self.orders.delete(id).await?;
        Ok(())
    }

    /// Per-status count and summed total, scoped to the actor unless admin
    pub async fn stats(&self, actor: &CurrentUser) -> AppResult<Vec<StatusBucket>> {
        let owner = if actor.is_admin() {
            None
        } else {
            Some(Self::actor_rid(actor)?)
        };
        Ok(self.orders.stats(owner.as_ref()).await?)
    }

    /// Atomically take the order's quantity out of stock
    ///
    /// Guard failure means another approval (or a stock edit) got there
    /// first; surfaced as Conflict with stock untouched.
    async fn reserve_for(&self, order: &Order) -> AppResult<Product> {
        let product = self
            .products
            .try_reserve_stock(&order.product.to_string(), order.quantity)
            .await?
            .ok_or_else(|| AppError::conflict("Insufficient stock to approve this order"))?;

        self.broadcast_stock(&product);

        if product.is_low_stock() {
            let message = format!(
                "{} is running low ({} left)",
                product.name, product.quantity
            );
            if let Err(e) = self
                .notifications
                .notify_admins(order.owner.clone(), NotificationType::LowStock, message)
                .await
            {
                tracing::warn!(error = %e, "failed to create low_stock notifications");
            }
        }

        Ok(product)
    }

    /// Put the order's quantity back into stock
    async fn restore_for(&self, order: &Order) -> AppResult<Product> {
        let product = self
            .products
            .restore_stock(&order.product.to_string(), order.quantity)
            .await?;
        self.broadcast_stock(&product);
        Ok(product)
    }

    fn broadcast_stock(&self, product: &Product) {
        if let Some(id) = &product.id {
            self.hub.broadcast(ServerEvent::StockUpdate {
                product_id: id.to_string(),
                quantity: product.quantity,
            });
        }
    }
}
