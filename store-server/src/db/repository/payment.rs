//! Payment Repository
//!
//! Payment rows are written inside the order placement transaction; this
//! repository reads them back and records gateway outcomes.

use super::{RepoError, RepoResult};
use shared::models::{Payment, PaymentStatus};
use sqlx::SqlitePool;

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<Payment>> {
    let rows = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payment WHERE order_id = ? ORDER BY created_at",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payment>> {
    let row = sqlx::query_as::<_, Payment>("SELECT * FROM payment WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Record a gateway outcome on a payment and mirror it on the order
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: PaymentStatus,
    reference: Option<String>,
) -> RepoResult<Payment> {
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE payment SET status = ?1, reference = COALESCE(?2, reference), updated_at = ?3 WHERE id = ?4",
    )
    .bind(status)
    .bind(reference)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Payment {id} not found")));
    }

    sqlx::query(
        "UPDATE orders SET payment_status = ?1, updated_at = ?2 WHERE id = (SELECT order_id FROM payment WHERE id = ?3)",
    )
    .bind(status)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment {id} not found")))
}
