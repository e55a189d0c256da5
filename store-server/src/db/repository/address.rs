//! Address Repository
//!
//! All lookups are owner-scoped: an address another user owns behaves as
//! if it does not exist.

use super::{RepoError, RepoResult};
use shared::models::{Address, AddressCreate, AddressUpdate};
use sqlx::SqlitePool;

pub async fn find_all_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Address>> {
    let rows = sqlx::query_as::<_, Address>(
        "SELECT * FROM address WHERE user_id = ? ORDER BY is_default DESC, created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_for_user(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> RepoResult<Option<Address>> {
    let row = sqlx::query_as::<_, Address>("SELECT * FROM address WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Unscoped lookup (expanding addresses on an order the caller already owns)
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Address>> {
    let row = sqlx::query_as::<_, Address>("SELECT * FROM address WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, user_id: i64, data: AddressCreate) -> RepoResult<Address> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let is_default = data.is_default.unwrap_or(false);

    let mut tx = pool.begin().await?;

    if is_default {
        sqlx::query("UPDATE address SET is_default = 0, updated_at = ?1 WHERE user_id = ?2")
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        "INSERT INTO address (id, user_id, label, line1, line2, city, region, postal_code, country, is_default, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
    )
    .bind(id)
    .bind(user_id)
    .bind(data.label)
    .bind(data.line1)
    .bind(data.line2)
    .bind(data.city)
    .bind(data.region)
    .bind(data.postal_code)
    .bind(data.country)
    .bind(is_default)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create address".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
    data: AddressUpdate,
) -> RepoResult<Address> {
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    if data.is_default == Some(true) {
        sqlx::query("UPDATE address SET is_default = 0, updated_at = ?1 WHERE user_id = ?2")
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    let rows = sqlx::query(
        "UPDATE address SET label = COALESCE(?1, label), line1 = COALESCE(?2, line1), line2 = COALESCE(?3, line2), city = COALESCE(?4, city), region = COALESCE(?5, region), postal_code = COALESCE(?6, postal_code), country = COALESCE(?7, country), is_default = COALESCE(?8, is_default), updated_at = ?9 WHERE id = ?10 AND user_id = ?11",
    )
    .bind(data.label)
    .bind(data.line1)
    .bind(data.line2)
    .bind(data.city)
    .bind(data.region)
    .bind(data.postal_code)
    .bind(data.country)
    .bind(data.is_default)
    .bind(now)
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Address {id} not found")));
    }

    tx.commit().await?;

    find_for_user(pool, id, user_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Address {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM address WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{seed_user, test_pool};

    fn sample(is_default: Option<bool>) -> AddressCreate {
        AddressCreate {
            label: Some("Home".into()),
            line1: "1 Main St".into(),
            line2: None,
            city: "Springfield".into(),
            region: None,
            postal_code: "12345".into(),
            country: "US".into(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_default_flag_is_exclusive() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;

        let first = create(&pool, user_id, sample(Some(true))).await.unwrap();
        let second = create(&pool, user_id, sample(Some(true))).await.unwrap();

        let first = find_for_user(&pool, first.id, user_id).await.unwrap().unwrap();
        assert!(!first.is_default);
        assert!(second.is_default);
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let pool = test_pool().await;
        let (alice, _) = seed_user(&pool, 1, "alice@b.com").await;
        let (bob, _) = seed_user(&pool, 2, "bob@b.com").await;

        let addr = create(&pool, alice, sample(None)).await.unwrap();

        // Bob can neither see nor delete Alice's address
        assert!(find_for_user(&pool, addr.id, bob).await.unwrap().is_none());
        assert!(!delete(&pool, addr.id, bob).await.unwrap());
        assert!(find_for_user(&pool, addr.id, alice).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_missing_address() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let err = update(
            &pool,
            999,
            user_id,
            AddressUpdate {
                label: None,
                line1: Some("2 Side St".into()),
                line2: None,
                city: None,
                region: None,
                postal_code: None,
                country: None,
                is_default: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
