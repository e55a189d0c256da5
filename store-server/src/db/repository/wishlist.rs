//! Wishlist Repository

use super::{RepoError, RepoResult};
use shared::models::{WishlistItem, WishlistLine};
use sqlx::SqlitePool;

pub async fn find_all_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<WishlistLine>> {
    let rows = sqlx::query_as::<_, WishlistLine>(
        "SELECT w.id, w.product_id, p.name AS product_name, p.base_price, p.allow_preorder, p.is_active, w.created_at FROM wishlist_item w JOIN product p ON p.id = w.product_id WHERE w.user_id = ? ORDER BY w.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn add(pool: &SqlitePool, user_id: i64, product_id: i64) -> RepoResult<WishlistItem> {
    let product = super::product::find_by_id(pool, product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| RepoError::NotFound(format!("Product {product_id} not found")))?;

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO wishlist_item (id, user_id, product_id, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(id)
    .bind(user_id)
    .bind(product.id)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("wishlist entry for product {product_id}"))
        }
        other => other,
    })?;

    let row = sqlx::query_as::<_, WishlistItem>("SELECT * FROM wishlist_item WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

pub async fn remove(pool: &SqlitePool, user_id: i64, product_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM wishlist_item WHERE user_id = ? AND product_id = ?")
        .bind(user_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
