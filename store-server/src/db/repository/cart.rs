//! Cart Repository
//!
//! One cart per user, born at registration. Adding the same
//! product + variant + preorder combination merges quantities; the unique
//! line index backs this up at the store level.

use super::{RepoError, RepoResult};
use shared::models::{Cart, CartItem, CartItemAdd, CartLine};
use sqlx::SqlitePool;

const CART_LINE_SELECT: &str = "SELECT ci.id, ci.product_id, p.name AS product_name, ci.product_variant_id, v.name AS variant_name, ci.quantity, ci.price, ci.is_preorder, i.quantity AS available FROM cart_item ci JOIN product p ON p.id = ci.product_id LEFT JOIN product_variant v ON v.id = ci.product_variant_id LEFT JOIN inventory i ON i.product_variant_id = v.id";

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Option<Cart>> {
    let row = sqlx::query_as::<_, Cart>("SELECT * FROM cart WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Fetch the user's cart, creating it on first access.
///
/// Registration already creates a cart; this covers accounts imported
/// through other channels.
pub async fn find_or_create_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Cart> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    // INSERT OR IGNORE: only inserts if the user has no cart yet
    sqlx::query(
        "INSERT OR IGNORE INTO cart (id, user_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
    )
    .bind(id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to ensure cart".into()))
}

/// Cart lines with product / variant / inventory context
pub async fn find_lines(pool: &SqlitePool, cart_id: i64) -> RepoResult<Vec<CartLine>> {
    let sql = format!("{} WHERE ci.cart_id = ? ORDER BY ci.created_at", CART_LINE_SELECT);
    let rows = sqlx::query_as::<_, CartLine>(&sql)
        .bind(cart_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Add a line to the user's cart, capturing the unit price at add time.
///
/// Preorder lines price from `preorder_price` (falling back to
/// `base_price`); regular lines price from the variant override or
/// `base_price`.
pub async fn add_item(
    pool: &SqlitePool,
    user_id: i64,
    data: CartItemAdd,
) -> RepoResult<CartItem> {
    if data.quantity < 1 {
        return Err(RepoError::Validation("quantity must be >= 1".into()));
    }

    let cart = find_or_create_for_user(pool, user_id).await?;

    let product = super::product::find_by_id(pool, data.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", data.product_id)))?;

    if data.is_preorder && !product.allow_preorder {
        return Err(RepoError::Validation(format!(
            "Product {} does not accept preorders",
            product.name
        )));
    }

    let variant = match data.product_variant_id {
        Some(variant_id) => {
            let variant = super::product::find_variant(pool, variant_id)
                .await?
                .filter(|v| v.is_active && v.product_id == product.id)
                .ok_or_else(|| {
                    RepoError::NotFound(format!("Variant {variant_id} not found"))
                })?;
            Some(variant)
        }
        None => None,
    };

    // Captured price, not re-read at checkout
    let price = if data.is_preorder {
        product.preorder_price.unwrap_or(product.base_price)
    } else {
        variant
            .as_ref()
            .map(|v| v.effective_price(product.base_price))
            .unwrap_or(product.base_price)
    };

    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    // Merge into an existing line first; insert a fresh one otherwise
    let merged = sqlx::query(
        "UPDATE cart_item SET quantity = quantity + ?1, updated_at = ?2 WHERE cart_id = ?3 AND product_id = ?4 AND COALESCE(product_variant_id, 0) = COALESCE(?5, 0) AND is_preorder = ?6",
    )
    .bind(data.quantity)
    .bind(now)
    .bind(cart.id)
    .bind(product.id)
    .bind(data.product_variant_id)
    .bind(data.is_preorder)
    .execute(&mut *tx)
    .await?;

    let item_id = if merged.rows_affected() == 0 {
        let id = shared::util::snowflake_id();
        sqlx::query(
            "INSERT INTO cart_item (id, cart_id, product_id, product_variant_id, quantity, price, is_preorder, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        )
        .bind(id)
        .bind(cart.id)
        .bind(product.id)
        .bind(data.product_variant_id)
        .bind(data.quantity)
        .bind(price)
        .bind(data.is_preorder)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        id
    } else {
        sqlx::query_scalar(
            "SELECT id FROM cart_item WHERE cart_id = ?1 AND product_id = ?2 AND COALESCE(product_variant_id, 0) = COALESCE(?3, 0) AND is_preorder = ?4",
        )
        .bind(cart.id)
        .bind(product.id)
        .bind(data.product_variant_id)
        .bind(data.is_preorder)
        .fetch_one(&mut *tx)
        .await?
    };

    sqlx::query("UPDATE cart SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(cart.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_item(pool, item_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to add cart item".into()))
}

pub async fn find_item(pool: &SqlitePool, item_id: i64) -> RepoResult<Option<CartItem>> {
    let row = sqlx::query_as::<_, CartItem>("SELECT * FROM cart_item WHERE id = ?")
        .bind(item_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Update a line's quantity; ownership enforced through the cart join
pub async fn update_item_quantity(
    pool: &SqlitePool,
    user_id: i64,
    item_id: i64,
    quantity: i64,
) -> RepoResult<CartItem> {
    if quantity < 1 {
        return Err(RepoError::Validation("quantity must be >= 1".into()));
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE cart_item SET quantity = ?1, updated_at = ?2 WHERE id = ?3 AND cart_id IN (SELECT id FROM cart WHERE user_id = ?4)",
    )
    .bind(quantity)
    .bind(now)
    .bind(item_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cart item {item_id} not found")));
    }
    find_item(pool, item_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cart item {item_id} not found")))
}

pub async fn remove_item(pool: &SqlitePool, user_id: i64, item_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "DELETE FROM cart_item WHERE id = ?1 AND cart_id IN (SELECT id FROM cart WHERE user_id = ?2)",
    )
    .bind(item_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Remove every line from the user's cart
pub async fn clear(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "DELETE FROM cart_item WHERE cart_id IN (SELECT id FROM cart WHERE user_id = ?)",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{
        seed_preorder_product, seed_product, seed_user, seed_variant, test_pool,
    };

    fn add(product_id: i64, variant_id: Option<i64>, quantity: i64, preorder: bool) -> CartItemAdd {
        CartItemAdd {
            product_id,
            product_variant_id: variant_id,
            quantity,
            is_preorder: preorder,
        }
    }

    #[tokio::test]
    async fn test_add_captures_variant_price() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_product(&pool, 10, "Widget", 9.99).await;
        let variant_id = seed_variant(&pool, 20, product_id, Some(12.49), 5).await;

        let item = add_item(&pool, user_id, add(product_id, Some(variant_id), 2, false))
            .await
            .unwrap();
        assert_eq!(item.price, 12.49);
        assert_eq!(item.quantity, 2);
        assert!(!item.is_preorder);
    }

    #[tokio::test]
    async fn test_same_line_merges_quantity() {
        let pool = test_pool().await;
        let (user_id, cart_id) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_product(&pool, 10, "Widget", 9.99).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 5).await;

        add_item(&pool, user_id, add(product_id, Some(variant_id), 2, false))
            .await
            .unwrap();
        let merged = add_item(&pool, user_id, add(product_id, Some(variant_id), 3, false))
            .await
            .unwrap();

        assert_eq!(merged.quantity, 5);
        let lines = find_lines(&pool, cart_id).await.unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn test_preorder_flag_is_a_separate_line() {
        let pool = test_pool().await;
        let (user_id, cart_id) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_preorder_product(&pool, 10, Some(89.99), None, None).await;

        add_item(&pool, user_id, add(product_id, None, 1, false))
            .await
            .unwrap();
        let pre = add_item(&pool, user_id, add(product_id, None, 1, true))
            .await
            .unwrap();

        // Preorder line priced from preorder_price
        assert_eq!(pre.price, 89.99);
        let lines = find_lines(&pool, cart_id).await.unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_preorder_rejected_when_not_allowed() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_product(&pool, 10, "Widget", 9.99).await;

        let err = add_item(&pool, user_id, add(product_id, None, 1, true))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_variant_of_other_product_rejected() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_a = seed_product(&pool, 10, "Widget A", 9.99).await;
        let product_b = seed_product(&pool, 11, "Widget B", 9.99).await;
        let variant_b = seed_variant(&pool, 20, product_b, None, 5).await;

        let err = add_item(&pool, user_id, add(product_a, Some(variant_b), 1, false))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_item_ownership_on_update_and_remove() {
        let pool = test_pool().await;
        let (alice, _) = seed_user(&pool, 1, "alice@b.com").await;
        let (bob, _) = seed_user(&pool, 2, "bob@b.com").await;
        let product_id = seed_product(&pool, 10, "Widget", 9.99).await;

        let item = add_item(&pool, alice, add(product_id, None, 1, false))
            .await
            .unwrap();

        assert!(update_item_quantity(&pool, bob, item.id, 5).await.is_err());
        assert!(!remove_item(&pool, bob, item.id).await.unwrap());
        assert!(remove_item(&pool, alice, item.id).await.unwrap());
    }
}
