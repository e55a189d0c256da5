//! Preorder Repository (reads)
//!
//! Placement, cancellation and status changes live in the `checkout`
//! module; this repository covers the read side.

use super::RepoResult;
use shared::models::{Preorder, PreorderStatusHistory};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Preorder>> {
    let row = sqlx::query_as::<_, Preorder>("SELECT * FROM preorder WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Owner-scoped lookup; admins pass `None` to see any preorder
pub async fn find_for_user(
    pool: &SqlitePool,
    id: i64,
    user_id: Option<i64>,
) -> RepoResult<Option<Preorder>> {
    let row = match user_id {
        Some(uid) => {
            sqlx::query_as::<_, Preorder>("SELECT * FROM preorder WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(uid)
                .fetch_optional(pool)
                .await?
        }
        None => find_by_id(pool, id).await?,
    };
    Ok(row)
}

pub async fn find_all_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Preorder>> {
    let rows = sqlx::query_as::<_, Preorder>(
        "SELECT * FROM preorder WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Preorder>> {
    let rows = sqlx::query_as::<_, Preorder>("SELECT * FROM preorder ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_history(
    pool: &SqlitePool,
    preorder_id: i64,
) -> RepoResult<Vec<PreorderStatusHistory>> {
    let rows = sqlx::query_as::<_, PreorderStatusHistory>(
        "SELECT * FROM preorder_status_history WHERE preorder_id = ? ORDER BY created_at, id",
    )
    .bind(preorder_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
