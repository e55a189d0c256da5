//! Preorder cancellation workflow
//!
//! PENDING/CONFIRMED preorders only. Atomically flips the status with a
//! reason + timestamp, gives the units back to the product's preorder
//! counter, and appends the transition to the history. When a deposit was
//! paid the response surfaces the refund owed; executing the refund is
//! the payment gateway's job.

use shared::models::{PreorderCancel, PreorderDetail, PreorderStatus, RefundInfo};
use sqlx::SqlitePool;

use super::CheckoutError;
use crate::db::repository;

pub async fn cancel_preorder(
    pool: &SqlitePool,
    user_id: Option<i64>,
    preorder_id: i64,
    req: PreorderCancel,
    actor_id: i64,
) -> Result<PreorderDetail, CheckoutError> {
    let preorder = repository::preorder::find_for_user(pool, preorder_id, user_id)
        .await?
        .ok_or(CheckoutError::PreorderNotFound { preorder_id })?;

    if !preorder.status.is_cancellable() {
        return Err(CheckoutError::InvalidPreorderTransition {
            from: preorder.status,
            to: PreorderStatus::Cancelled,
        });
    }

    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    // Compare-and-swap on the previous status
    let updated = sqlx::query(
        "UPDATE preorder SET status = 'CANCELLED', cancel_reason = ?1, cancelled_at = ?2, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(&req.reason)
    .bind(now)
    .bind(preorder_id)
    .bind(preorder.status)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        // Status moved under us; report against what is there now
        let current: Option<PreorderStatus> =
            sqlx::query_scalar("SELECT status FROM preorder WHERE id = ?")
                .bind(preorder_id)
                .fetch_optional(&mut *tx)
                .await?;
        return Err(CheckoutError::InvalidPreorderTransition {
            from: current.unwrap_or(preorder.status),
            to: PreorderStatus::Cancelled,
        });
    }

    // The units no longer count against the product's preorder capacity.
    // MAX guards against drift from historical data.
    sqlx::query(
        "UPDATE product SET preorder_count = MAX(preorder_count - ?1, 0), updated_at = ?2 WHERE id = ?3",
    )
    .bind(preorder.quantity)
    .bind(now)
    .bind(preorder.product_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO preorder_status_history (id, preorder_id, from_status, to_status, actor_id, note, created_at) VALUES (?1, ?2, ?3, 'CANCELLED', ?4, ?5, ?6)",
    )
    .bind(shared::util::snowflake_id())
    .bind(preorder_id)
    .bind(preorder.status)
    .bind(actor_id)
    .bind(&req.reason)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(preorder_id, actor_id, "Preorder cancelled");

    let cancelled = repository::preorder::find_by_id(pool, preorder_id)
        .await?
        .ok_or(CheckoutError::PreorderNotFound { preorder_id })?;

    // Surface the refund owed for a paid deposit
    let refund = (cancelled.deposit_paid > 0.0).then(|| RefundInfo {
        amount: cancelled.deposit_paid,
        status: "REFUND_PENDING".to_string(),
    });

    Ok(PreorderDetail {
        preorder: cancelled,
        refund,
    })
}
