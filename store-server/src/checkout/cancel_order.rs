//! Order cancellation workflow
//!
//! PENDING/CONFIRMED orders only. Atomically flips the status, restores
//! inventory for non-preorder variant lines, and appends the transition
//! to the order's history.

use shared::models::{OrderDetail, OrderItem, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};

use super::CheckoutError;
use crate::db::repository;

/// Give back the stock an order was holding. Preorder lines never held
/// any, so only regular variant lines are touched.
pub(crate) async fn restore_inventory(
    conn: &mut SqliteConnection,
    items: &[OrderItem],
    now: i64,
) -> Result<(), sqlx::Error> {
    for item in items {
        if item.is_preorder {
            continue;
        }
        let Some(variant_id) = item.product_variant_id else {
            continue;
        };
        sqlx::query(
            "UPDATE inventory SET quantity = quantity + ?1, updated_at = ?2 WHERE product_variant_id = ?3",
        )
        .bind(item.quantity)
        .bind(now)
        .bind(variant_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Cancel an order on behalf of its owner (`user_id = Some`) or an admin
/// (`user_id = None`). `actor_id` lands in the history record.
pub async fn cancel_order(
    pool: &SqlitePool,
    user_id: Option<i64>,
    order_id: i64,
    actor_id: i64,
    note: Option<String>,
) -> Result<OrderDetail, CheckoutError> {
    let order = repository::order::find_for_user(pool, order_id, user_id)
        .await?
        .ok_or(CheckoutError::OrderNotFound { order_id })?;

    if !order.status.is_cancellable() {
        return Err(CheckoutError::InvalidOrderTransition {
            from: order.status,
            to: OrderStatus::Cancelled,
        });
    }

    let items = repository::order::find_items(pool, order_id).await?;
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    // Compare-and-swap on the previous status so a concurrent transition
    // cannot be overwritten
    let updated = sqlx::query(
        "UPDATE orders SET status = 'CANCELLED', updated_at = ?1 WHERE id = ?2 AND status = ?3",
    )
    .bind(now)
    .bind(order_id)
    .bind(order.status)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        // Status moved under us; report against what is there now
        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;
        return Err(CheckoutError::InvalidOrderTransition {
            from: current.unwrap_or(order.status),
            to: OrderStatus::Cancelled,
        });
    }

    restore_inventory(&mut tx, &items, now).await?;

    sqlx::query(
        "INSERT INTO order_status_history (id, order_id, from_status, to_status, actor_id, note, created_at) VALUES (?1, ?2, ?3, 'CANCELLED', ?4, ?5, ?6)",
    )
    .bind(shared::util::snowflake_id())
    .bind(order_id)
    .bind(order.status)
    .bind(actor_id)
    .bind(note)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(order_id, actor_id, "Order cancelled");

    let order = repository::order::find_by_id(pool, order_id)
        .await?
        .ok_or(CheckoutError::OrderNotFound { order_id })?;
    Ok(repository::order::expand(pool, order).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::place_order;
    use crate::db::repository::test_support::{
        inventory_quantity, seed_address, seed_preorder_product, seed_product, seed_user,
        seed_variant, test_pool,
    };
    use shared::models::{CartItemAdd, OrderCreate};

    async fn place_sample_order(
        pool: &SqlitePool,
        user_id: i64,
        address_id: i64,
        variant_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> OrderDetail {
        repository::cart::add_item(
            pool,
            user_id,
            CartItemAdd {
                product_id,
                product_variant_id: Some(variant_id),
                quantity,
                is_preorder: false,
            },
        )
        .await
        .unwrap();
        place_order(
            pool,
            user_id,
            OrderCreate {
                shipping_address_id: address_id,
                billing_address_id: None,
                payment_method: "card".into(),
                notes: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_cancel_restores_inventory_exactly() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let address_id = seed_address(&pool, 100, user_id).await;
        let product_id = seed_product(&pool, 10, "Widget", 10.0).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 5).await;

        let detail =
            place_sample_order(&pool, user_id, address_id, variant_id, product_id, 2).await;
        assert_eq!(inventory_quantity(&pool, variant_id).await, 3);

        let cancelled = cancel_order(&pool, Some(user_id), detail.order.id, user_id, None)
            .await
            .unwrap();
        assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

        // Round-trip: cancel(create(order)) restores pre-order stock
        assert_eq!(inventory_quantity(&pool, variant_id).await, 5);

        // History carries the transition
        let history = repository::order::find_history(&pool, detail.order.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from_status, OrderStatus::Pending);
        assert_eq!(history[0].to_status, OrderStatus::Cancelled);
        assert_eq!(history[0].actor_id, user_id);
    }

    #[tokio::test]
    async fn test_cancel_is_not_idempotent() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let address_id = seed_address(&pool, 100, user_id).await;
        let product_id = seed_product(&pool, 10, "Widget", 10.0).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 5).await;

        let detail =
            place_sample_order(&pool, user_id, address_id, variant_id, product_id, 2).await;
        cancel_order(&pool, Some(user_id), detail.order.id, user_id, None)
            .await
            .unwrap();

        // Cancelling again is rejected, not a silent success, and stock
        // is not restored twice
        let err = cancel_order(&pool, Some(user_id), detail.order.id, user_id, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidOrderTransition {
                from: OrderStatus::Cancelled,
                ..
            }
        ));
        assert_eq!(inventory_quantity(&pool, variant_id).await, 5);
    }

    #[tokio::test]
    async fn test_preorder_lines_do_not_restore_inventory() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let address_id = seed_address(&pool, 100, user_id).await;
        let preorderable = seed_preorder_product(&pool, 11, Some(50.0), None, None).await;
        let pre_variant = seed_variant(&pool, 21, preorderable, None, 3).await;

        repository::cart::add_item(
            &pool,
            user_id,
            CartItemAdd {
                product_id: preorderable,
                product_variant_id: Some(pre_variant),
                quantity: 2,
                is_preorder: true,
            },
        )
        .await
        .unwrap();
        let detail = place_order(
            &pool,
            user_id,
            OrderCreate {
                shipping_address_id: address_id,
                billing_address_id: None,
                payment_method: "card".into(),
                notes: None,
            },
        )
        .await
        .unwrap();

        cancel_order(&pool, Some(user_id), detail.order.id, user_id, None)
            .await
            .unwrap();

        // Placement never took stock, cancellation must not add any
        assert_eq!(inventory_quantity(&pool, pre_variant).await, 3);
    }

    #[tokio::test]
    async fn test_foreign_order_reads_as_not_found() {
        let pool = test_pool().await;
        let (alice, _) = seed_user(&pool, 1, "alice@b.com").await;
        let (bob, _) = seed_user(&pool, 2, "bob@b.com").await;
        let address_id = seed_address(&pool, 100, alice).await;
        let product_id = seed_product(&pool, 10, "Widget", 10.0).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 5).await;

        let detail =
            place_sample_order(&pool, alice, address_id, variant_id, product_id, 1).await;

        let err = cancel_order(&pool, Some(bob), detail.order.id, bob, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound { .. }));
    }
}
