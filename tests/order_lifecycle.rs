//! End-to-end order lifecycle tests against the in-memory engine
//!
//! Covers the inventory round-trip, the transition table, authorization
//! gates, notification persistence and the realtime side effects.

use stockroom::auth::CurrentUser;
use stockroom::core::ServerState;
use stockroom::db::models::{
    NotificationEntry, NotificationType, OrderCreate, OrderPriority, OrderStatus,
    OrderStatusUpdate, OrderUpdate, ProductCreate, Role, User, UserCreate,
};
use stockroom::realtime::ServerEvent;
use stockroom::utils::AppError;

async fn test_state() -> ServerState {
    ServerState::in_memory()
        .await
        .expect("failed to build in-memory state")
}

fn as_current(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id.as_ref().expect("user without id").to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    }
}

async fn create_user(state: &ServerState, name: &str, email: &str, role: Role) -> CurrentUser {
    let user = state
        .users()
        .create(UserCreate {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            role,
        })
        .await
        .expect("failed to create user");
    as_current(&user)
}

/// Seed one product (price 10.0, quantity 5, threshold 5) plus an admin and
/// an employee account
async fn seed(state: &ServerState) -> (CurrentUser, CurrentUser, String) {
    let admin = create_user(state, "Admin", "admin@example.com", Role::Admin).await;
    let employee = create_user(state, "Erin", "erin@example.com", Role::Employee).await;

    let category = state
        .categories()
        .create(stockroom::db::models::CategoryCreate {
            name: "Beverages".to_string(),
            description: None,
        })
        .await
        .expect("failed to create category");
    let supplier = state
        .suppliers()
        .create(stockroom::db::models::SupplierCreate {
            name: "Acme".to_string(),
            email: Some("sales@acme.example".to_string()),
            phone: None,
            address: None,
        })
        .await
        .expect("failed to create supplier");

    let product = state
        .products()
        .create(ProductCreate {
            name: "Coffee Beans".to_string(),
            category: category.id.as_ref().unwrap().to_string(),
            supplier: supplier.id.as_ref().unwrap().to_string(),
            price: 10.0,
            quantity: 5,
            low_stock_threshold: None,
            description: None,
        })
        .await
        .expect("failed to create product");

    (admin, employee, product.id.unwrap().to_string())
}

fn place_request(product_id: &str, quantity: i64) -> OrderCreate {
    OrderCreate {
        product: product_id.to_string(),
        quantity,
        customer_name: "Walk-in".to_string(),
        priority: OrderPriority::Medium,
        notes: None,
    }
}

async fn product_quantity(state: &ServerState, product_id: &str) -> i64 {
    state
        .products()
        .find_by_id(product_id)
        .await
        .unwrap()
        .unwrap()
        .quantity
}

#[tokio::test]
async fn placing_an_order_freezes_total_and_leaves_stock_untouched() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 3))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, 30.0);
    assert_eq!(product_quantity(&state, &product_id).await, 5);

    // Every admin got an order_placed notification
    let feed = state
        .notification_service()
        .list_feed(&admin.id, false)
        .await
        .unwrap();
    assert!(feed.iter().any(|e| matches!(
        e,
        NotificationEntry::Persisted(n)
            if n.notification_type == NotificationType::OrderPlaced
    )));
}

#[tokio::test]
async fn placing_beyond_available_stock_is_a_conflict() {
    let state = test_state().await;
    let (_admin, employee, product_id) = seed(&state).await;

    let err = state
        .order_service()
        .place(&employee, place_request(&product_id, 6))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(product_quantity(&state, &product_id).await, 5);
}

#[tokio::test]
async fn approval_decrements_stock_and_broadcasts_the_new_quantity() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 3))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    let mut rx = state.hub().subscribe();
    let approved = state
        .order_service()
        .update_status(
            &admin,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Approved,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(approved.status, OrderStatus::Approved);
    assert!(approved.approved_by.is_some());
    assert!(approved.approved_at.is_some());
    assert_eq!(product_quantity(&state, &product_id).await, 2);

    match rx.recv().await.unwrap() {
        ServerEvent::StockUpdate {
            product_id: pid,
            quantity,
        } => {
            assert_eq!(pid, product_id);
            assert_eq!(quantity, 2);
        }
        other => panic!("Expected StockUpdate, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelling_an_approved_order_restores_stock() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 3))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    state
        .order_service()
        .update_status(
            &admin,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Approved,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(product_quantity(&state, &product_id).await, 2);

    let cancelled = state
        .order_service()
        .cancel(&employee, &order_id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(product_quantity(&state, &product_id).await, 5);
}

#[tokio::test]
async fn deleting_an_approved_order_restores_stock_first() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 2))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    state
        .order_service()
        .update_status(
            &admin,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Approved,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(product_quantity(&state, &product_id).await, 3);

    state
        .order_service()
        .delete(&admin, &order_id)
        .await
        .unwrap();
    assert_eq!(product_quantity(&state, &product_id).await, 5);
    assert!(
        state
            .order_service()
            .get(&admin, &order_id)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn transition_jumps_are_conflicts() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    let err = state
        .order_service()
        .update_status(
            &admin,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Shipped,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(product_quantity(&state, &product_id).await, 5);
}

#[tokio::test]
async fn privileged_statuses_are_admin_only() {
    let state = test_state().await;
    let (_admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    let err = state
        .order_service()
        .update_status(
            &employee,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Approved,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn rejection_stores_the_reason() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    let rejected = state
        .order_service()
        .update_status(
            &admin,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Rejected,
                rejection_reason: Some("Out of season".to_string()),
                estimated_delivery: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(rejected.status, OrderStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Out of season"));
    // No stock moved
    assert_eq!(product_quantity(&state, &product_id).await, 5);
}

#[tokio::test]
async fn editing_a_pending_order_recomputes_the_total() {
    let state = test_state().await;
    let (_admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 2))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();
    assert_eq!(order.total_amount, 20.0);

    let updated = state
        .order_service()
        .update_fields(
            &employee,
            &order_id,
            OrderUpdate {
                quantity: Some(4),
                priority: Some(OrderPriority::High),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 4);
    assert_eq!(updated.total_amount, 40.0);

    // Beyond available stock
    let err = state
        .order_service()
        .update_fields(
            &employee,
            &order_id,
            OrderUpdate {
                quantity: Some(6),
                priority: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn non_owners_cannot_edit_or_cancel() {
    let state = test_state().await;
    let (_admin, employee, product_id) = seed(&state).await;
    let other = create_user(&state, "Omar", "omar@example.com", Role::Employee).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    let err = state
        .order_service()
        .update_fields(
            &other,
            &order_id,
            OrderUpdate {
                quantity: Some(2),
                priority: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state.order_service().cancel(&other, &order_id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn non_owners_cannot_change_order_status() {
    let state = test_state().await;
    let (_admin, employee, product_id) = seed(&state).await;
    let other = create_user(&state, "Omar", "omar@example.com", Role::Employee).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 2))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    // Cancelled is reachable without admin rights, but not on someone
    // else's order
    let err = state
        .order_service()
        .update_status(
            &other,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Cancelled,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Privileged targets are equally off limits
    let err = state
        .order_service()
        .update_status(
            &other,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Approved,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let untouched = state.order_service().get(&employee, &order_id).await.unwrap();
    assert_eq!(untouched.status, OrderStatus::Pending);
    assert_eq!(product_quantity(&state, &product_id).await, 5);
}

#[tokio::test]
async fn owner_cancelling_via_status_endpoint_does_not_notify_themselves() {
    let state = test_state().await;
    let (_admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    let cancelled = state
        .order_service()
        .update_status(
            &employee,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Cancelled,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let feed = state
        .notification_service()
        .list_feed(&employee.id, false)
        .await
        .unwrap();
    assert!(!feed.iter().any(|e| matches!(
        e,
        NotificationEntry::Persisted(n)
            if n.notification_type == NotificationType::OrderStatusUpdate
    )));
}

#[tokio::test]
async fn edits_after_pending_are_conflicts() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();
    let order_id = order.id.unwrap().to_string();

    state
        .order_service()
        .update_status(
            &admin,
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Approved,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap();

    let err = state
        .order_service()
        .update_fields(
            &employee,
            &order_id,
            OrderUpdate {
                quantity: Some(2),
                priority: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn concurrent_approvals_over_depleted_stock_admit_exactly_one() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    // Drop the product to quantity 2; both orders want all of it
    state
        .products()
        .update(
            &product_id,
            stockroom::db::models::ProductUpdate {
                name: None,
                category: None,
                supplier: None,
                price: None,
                quantity: Some(2),
                low_stock_threshold: None,
                description: None,
            },
        )
        .await
        .unwrap();

    let order_a = state
        .order_service()
        .place(&employee, place_request(&product_id, 2))
        .await
        .unwrap();
    let order_b = state
        .order_service()
        .place(&employee, place_request(&product_id, 2))
        .await
        .unwrap();
    let id_a = order_a.id.unwrap().to_string();
    let id_b = order_b.id.unwrap().to_string();

    let approve = |id: String| {
        let svc = state.order_service().clone();
        let admin = admin.clone();
        async move {
            svc.update_status(
                &admin,
                &id,
                OrderStatusUpdate {
                    status: OrderStatus::Approved,
                    rejection_reason: None,
                    estimated_delivery: None,
                },
            )
            .await
        }
    };

    let (res_a, res_b) = tokio::join!(approve(id_a), approve(id_b));

    let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one approval must win");
    let conflict = if res_a.is_err() { res_a } else { res_b };
    assert!(matches!(conflict.unwrap_err(), AppError::Conflict(_)));
    assert_eq!(product_quantity(&state, &product_id).await, 0);
}

#[tokio::test]
async fn notifications_persist_for_offline_recipients_and_read_state_sticks() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    // Employee has no live connection when the status changes
    let order = state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();
    state
        .order_service()
        .update_status(
            &admin,
            &order.id.unwrap().to_string(),
            OrderStatusUpdate {
                status: OrderStatus::Approved,
                rejection_reason: None,
                estimated_delivery: None,
            },
        )
        .await
        .unwrap();

    let feed = state
        .notification_service()
        .list_feed(&employee.id, false)
        .await
        .unwrap();
    let unread = feed
        .iter()
        .find_map(|e| match e {
            NotificationEntry::Persisted(n)
                if n.notification_type == NotificationType::OrderStatusUpdate =>
            {
                Some(n.clone())
            }
            _ => None,
        })
        .expect("status-change notification must be persisted");
    assert!(!unread.is_read);

    let nid = unread.id.unwrap().to_string();
    state.notification_service().mark_read(&nid).await.unwrap();
    // Marking twice stays read
    state.notification_service().mark_read(&nid).await.unwrap();

    let feed = state
        .notification_service()
        .list_feed(&employee.id, false)
        .await
        .unwrap();
    assert!(feed.iter().any(|e| matches!(
        e,
        NotificationEntry::Persisted(n)
            if n.id.as_ref().map(|i| i.to_string()) == Some(nid.clone()) && n.is_read
    )));
}

#[tokio::test]
async fn derived_entries_appear_for_admins_and_mark_read_is_a_noop() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;

    // A pending order plus a product at its threshold
    state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();

    let feed = state
        .notification_service()
        .list_feed(&admin.id, true)
        .await
        .unwrap();
    let derived_ids: Vec<&str> = feed
        .iter()
        .filter_map(|e| match e {
            NotificationEntry::Derived(d) => Some(d.id.as_str()),
            _ => None,
        })
        .collect();
    assert!(derived_ids.iter().any(|id| id.starts_with("derived:low_stock:")));
    assert!(derived_ids.contains(&"derived:pending_orders"));

    // Derived ids have no server-side read state
    state
        .notification_service()
        .mark_read("derived:pending_orders")
        .await
        .unwrap();
}

#[tokio::test]
async fn registration_and_presence_are_independent_signals() {
    let state = test_state().await;
    let (_admin, employee, _product_id) = seed(&state).await;

    // Register-only client: addressable but not listed online
    let (_handle, mut rx) = state.hub().register(&employee.id);
    assert!(!state.presence().is_online(&employee.id));

    state.hub().send_to(
        &employee.id,
        ServerEvent::Notification(serde_json::json!({"message": "hello"})),
    );
    assert!(matches!(
        rx.recv().await.unwrap(),
        ServerEvent::Notification(_)
    ));

    // Presence flips only on the explicit announcement
    assert!(state.presence().mark_online(&employee.id));
    assert!(state.presence().is_online(&employee.id));
    assert!(state.presence().mark_offline(&employee.id));
    assert!(!state.presence().is_online(&employee.id));
}

#[tokio::test]
async fn stats_are_scoped_to_the_actor_unless_admin() {
    let state = test_state().await;
    let (admin, employee, product_id) = seed(&state).await;
    let other = create_user(&state, "Omar", "omar@example.com", Role::Employee).await;

    state
        .order_service()
        .place(&employee, place_request(&product_id, 1))
        .await
        .unwrap();
    state
        .order_service()
        .place(&other, place_request(&product_id, 2))
        .await
        .unwrap();

    let own: i64 = state
        .order_service()
        .stats(&employee)
        .await
        .unwrap()
        .iter()
        .map(|b| b.count)
        .sum();
    assert_eq!(own, 1);

    let all: i64 = state
        .order_service()
        .stats(&admin)
        .await
        .unwrap()
        .iter()
        .map(|b| b.count)
        .sum();
    assert_eq!(all, 2);
}
