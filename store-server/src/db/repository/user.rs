//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{ProfileUpdate, User, UserUpdate};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM user WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM user WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let rows = sqlx::query_as::<_, User>("SELECT * FROM user ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Create a user together with their cart, atomically.
///
/// A cart exists exactly once per user for the whole account lifetime, so
/// it is born in the registration transaction.
pub async fn create(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    name: &str,
    role: &str,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let user_id = shared::util::snowflake_id();
    let cart_id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO user (id, email, password_hash, name, role, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(user_id)
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("email {email}")),
        other => other,
    })?;

    sqlx::query("INSERT INTO cart (id, user_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)")
        .bind(cart_id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Admin-side update: role and/or active flag
pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE user SET role = COALESCE(?1, role), is_active = COALESCE(?2, is_active), updated_at = ?3 WHERE id = ?4",
    )
    .bind(data.role)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Self-service profile update; password arrives already hashed
pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    data: ProfileUpdate,
    password_hash: Option<String>,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE user SET name = COALESCE(?1, name), password_hash = COALESCE(?2, password_hash), updated_at = ?3 WHERE id = ?4",
    )
    .bind(data.name)
    .bind(password_hash)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    #[tokio::test]
    async fn test_create_also_creates_cart() {
        let pool = test_pool().await;
        let user = create(&pool, "jane@example.com", "hash", "Jane", "customer")
            .await
            .unwrap();

        let cart_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cart WHERE user_id = ?")
                .bind(user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(cart_count, 1);
        assert_eq!(user.email, "jane@example.com");
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_and_rolled_back() {
        let pool = test_pool().await;
        create(&pool, "jane@example.com", "hash", "Jane", "customer")
            .await
            .unwrap();
        let err = create(&pool, "jane@example.com", "hash2", "Impostor", "customer")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // No stray cart from the failed registration
        let carts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(carts, 1);
    }

    #[tokio::test]
    async fn test_admin_update_role() {
        let pool = test_pool().await;
        let user = create(&pool, "jane@example.com", "hash", "Jane", "customer")
            .await
            .unwrap();
        let updated = update(
            &pool,
            user.id,
            UserUpdate {
                role: Some("admin".into()),
                is_active: None,
            },
        )
        .await
        .unwrap();
        assert!(updated.is_admin());
        assert!(updated.is_active);
    }
}
