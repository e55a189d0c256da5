//! Review Repository

use super::{RepoError, RepoResult};
use shared::models::{Review, ReviewCreate, ReviewUpdate, ReviewWithAuthor};
use sqlx::SqlitePool;

const REVIEW_WITH_AUTHOR_SELECT: &str = "SELECT r.id, r.user_id, u.name AS user_name, r.product_id, r.rating, r.title, r.body, r.created_at, r.updated_at FROM review r JOIN user u ON u.id = r.user_id";

pub async fn find_by_product(
    pool: &SqlitePool,
    product_id: i64,
) -> RepoResult<Vec<ReviewWithAuthor>> {
    let sql = format!(
        "{} WHERE r.product_id = ? ORDER BY r.created_at DESC",
        REVIEW_WITH_AUTHOR_SELECT
    );
    let rows = sqlx::query_as::<_, ReviewWithAuthor>(&sql)
        .bind(product_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Review>> {
    let row = sqlx::query_as::<_, Review>("SELECT * FROM review WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, user_id: i64, data: ReviewCreate) -> RepoResult<Review> {
    if !(1..=5).contains(&data.rating) {
        return Err(RepoError::Validation("rating must be between 1 and 5".into()));
    }
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO review (id, user_id, product_id, rating, title, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(user_id)
    .bind(data.product_id)
    .bind(data.rating)
    .bind(data.title)
    .bind(data.body)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("review for product {}", data.product_id))
        }
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create review".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
    data: ReviewUpdate,
) -> RepoResult<Review> {
    if let Some(rating) = data.rating
        && !(1..=5).contains(&rating)
    {
        return Err(RepoError::Validation("rating must be between 1 and 5".into()));
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE review SET rating = COALESCE(?1, rating), title = COALESCE(?2, title), body = COALESCE(?3, body), updated_at = ?4 WHERE id = ?5 AND user_id = ?6",
    )
    .bind(data.rating)
    .bind(data.title)
    .bind(data.body)
    .bind(now)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Review {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Review {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM review WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
