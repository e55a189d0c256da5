//! Order Repository (reads)
//!
//! Order creation, cancellation and status changes are multi-table
//! transactions owned by the `checkout` module; this repository covers
//! the read side.

use super::RepoResult;
use shared::models::{Order, OrderDetail, OrderItem, OrderStatusHistory};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Owner-scoped lookup; admins pass `None` to see any order
pub async fn find_for_user(
    pool: &SqlitePool,
    id: i64,
    user_id: Option<i64>,
) -> RepoResult<Option<Order>> {
    let row = match user_id {
        Some(uid) => {
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(uid)
                .fetch_optional(pool)
                .await?
        }
        None => find_by_id(pool, id).await?,
    };
    Ok(row)
}

pub async fn find_all_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Order>> {
    let rows =
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_history(
    pool: &SqlitePool,
    order_id: i64,
) -> RepoResult<Vec<OrderStatusHistory>> {
    let rows = sqlx::query_as::<_, OrderStatusHistory>(
        "SELECT * FROM order_status_history WHERE order_id = ? ORDER BY created_at, id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Expand an order into its detail view (items + addresses)
pub async fn expand(pool: &SqlitePool, order: Order) -> RepoResult<OrderDetail> {
    let items = find_items(pool, order.id).await?;
    let shipping_address = super::address::find_by_id(pool, order.shipping_address_id).await?;
    let billing_address = match order.billing_address_id {
        Some(id) => super::address::find_by_id(pool, id).await?,
        None => None,
    };
    Ok(OrderDetail {
        order,
        items,
        shipping_address,
        billing_address,
    })
}
