//! Status transition workflows (admin-driven)
//!
//! The allowed-transition tables live on the status enums in `shared`;
//! this module applies them: compare-and-swap status update, side effects
//! (inventory restore on order cancellation, preorder counter release),
//! and an immutable history record per accepted transition.

use shared::models::{OrderDetail, OrderStatus, Preorder, PreorderStatus};
use sqlx::SqlitePool;

use super::CheckoutError;
use super::cancel_order::restore_inventory;
use crate::db::repository;

pub async fn update_order_status(
    pool: &SqlitePool,
    order_id: i64,
    new_status: OrderStatus,
    tracking_number: Option<String>,
    note: Option<String>,
    actor_id: i64,
) -> Result<OrderDetail, CheckoutError> {
    let order = repository::order::find_by_id(pool, order_id)
        .await?
        .ok_or(CheckoutError::OrderNotFound { order_id })?;

    if !order.status.can_transition_to(new_status) {
        return Err(CheckoutError::InvalidOrderTransition {
            from: order.status,
            to: new_status,
        });
    }

    let now = shared::util::now_millis();
    let items = if new_status == OrderStatus::Cancelled {
        repository::order::find_items(pool, order_id).await?
    } else {
        Vec::new()
    };

    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE orders SET status = ?1, tracking_number = COALESCE(?2, tracking_number), updated_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(new_status)
    .bind(&tracking_number)
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
            to: new_status,
        });
    }

    // Admin cancellation restores stock exactly like the customer flow
    if new_status == OrderStatus::Cancelled {
        restore_inventory(&mut tx, &items, now).await?;
    }

    sqlx::query(
        "INSERT INTO order_status_history (id, order_id, from_status, to_status, actor_id, note, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(shared::util::snowflake_id())
    .bind(order_id)
    .bind(order.status)
    .bind(new_status)
    .bind(actor_id)
    .bind(&note)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        order_id,
        from = order.status.as_str(),
        to = new_status.as_str(),
        actor_id,
        "Order status updated"
    );

    let order = repository::order::find_by_id(pool, order_id)
        .await?
        .ok_or(CheckoutError::OrderNotFound { order_id })?;
    Ok(repository::order::expand(pool, order).await?)
}

pub async fn update_preorder_status(
    pool: &SqlitePool,
    preorder_id: i64,
    new_status: PreorderStatus,
    note: Option<String>,
    actor_id: i64,
) -> Result<Preorder, CheckoutError> {
    let preorder = repository::preorder::find_by_id(pool, preorder_id)
        .await?
        .ok_or(CheckoutError::PreorderNotFound { preorder_id })?;

    if !preorder.status.can_transition_to(new_status) {
        return Err(CheckoutError::InvalidPreorderTransition {
            from: preorder.status,
            to: new_status,
        });
    }

    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let updated = if new_status == PreorderStatus::Cancelled {
        sqlx::query(
            "UPDATE preorder SET status = 'CANCELLED', cancel_reason = COALESCE(?1, cancel_reason), cancelled_at = ?2, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        )
        .bind(&note)
        .bind(now)
        .bind(preorder_id)
        .bind(preorder.status)
        .execute(&mut *tx)
        .await?
    } else {
        sqlx::query(
            "UPDATE preorder SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        )
        .bind(new_status)
        .bind(now)
        .bind(preorder_id)
        .bind(preorder.status)
        .execute(&mut *tx)
        .await?
    };
    if updated.rows_affected() == 0 {
        let current: Option<PreorderStatus> =
            sqlx::query_scalar("SELECT status FROM preorder WHERE id = ?")
                .bind(preorder_id)
                .fetch_optional(&mut *tx)
                .await?;
        return Err(CheckoutError::InvalidPreorderTransition {
            from: current.unwrap_or(preorder.status),
            to: new_status,
        });
    }

    // Leaving the active set (PENDING/CONFIRMED) releases the units from
    // the product's preorder capacity, mirroring the limit-check SUM
    if preorder.status.is_active() && !new_status.is_active() {
        sqlx::query(
            "UPDATE product SET preorder_count = MAX(preorder_count - ?1, 0), updated_at = ?2 WHERE id = ?3",
        )
        .bind(preorder.quantity)
        .bind(now)
        .bind(preorder.product_id)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "INSERT INTO preorder_status_history (id, preorder_id, from_status, to_status, actor_id, note, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(shared::util::snowflake_id())
    .bind(preorder_id)
    .bind(preorder.status)
    .bind(new_status)
    .bind(actor_id)
    .bind(&note)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        preorder_id,
        from = preorder.status.as_str(),
        to = new_status.as_str(),
        actor_id,
        "Preorder status updated"
    );

    repository::preorder::find_by_id(pool, preorder_id)
        .await?
        .ok_or(CheckoutError::PreorderNotFound { preorder_id })
}
