//! Preorder placement workflow
//!
//! Eligibility, window, limit, duplicate and address checks in order, each
//! with its own failure kind, then deposit/remaining split and an atomic
//! insert + counter increment. Inventory is never touched: a preorder is a
//! claim on future stock, not on the shelf.

use shared::models::{Preorder, PreorderCreate, PreorderStatus};
use sqlx::SqlitePool;

use super::{CheckoutError, money};
use crate::db::repository;

pub async fn place_preorder(
    pool: &SqlitePool,
    user_id: i64,
    req: PreorderCreate,
) -> Result<Preorder, CheckoutError> {
    money::validate_quantity(req.quantity)?;
    if let Some(deposit) = req.deposit_amount {
        money::validate_amount(deposit, "deposit_amount")?;
    }

    // 1. Product must exist, be active, and accept preorders
    let product = repository::product::find_by_id(pool, req.product_id)
        .await?
        .filter(|p| p.is_active && p.allow_preorder)
        .ok_or(CheckoutError::PreorderNotAllowed {
            product_id: req.product_id,
        })?;

    // 2. Variant, when given, must be an active variant of this product
    if let Some(variant_id) = req.product_variant_id {
        repository::product::find_variant(pool, variant_id)
            .await?
            .filter(|v| v.is_active && v.product_id == product.id)
            .ok_or(CheckoutError::VariantNotFound { variant_id })?;
    }

    // 3. The window closes once the expected stock date has passed
    let now = shared::util::now_millis();
    if let Some(expected_date) = product.expected_stock_date
        && expected_date < now
    {
        return Err(CheckoutError::PreorderWindowClosed { expected_date });
    }

    // 7. Effective unit price: preorder price, falling back to base price
    let price = product.preorder_price.unwrap_or(product.base_price);

    // 8. Deposit can never exceed the total
    let total_amount = money::line_total(price, req.quantity);
    let (deposit_paid, remaining_amount) =
        money::split_deposit(total_amount, req.deposit_amount.unwrap_or(0.0));

    // 9. A paid deposit confirms the preorder immediately
    let status = if deposit_paid > 0.0 {
        PreorderStatus::Confirmed
    } else {
        PreorderStatus::Pending
    };

    let preorder_id = shared::util::snowflake_id();

    // Steps 4-6 re-read shared state, so they run inside the write
    // transaction; SQLite's single-writer serialization makes the
    // limit/duplicate checks race-free.
    let mut tx = pool.begin().await?;

    // 4. Limit check against the sum of active preorder quantities
    if let Some(limit) = product.preorder_limit {
        let active: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM preorder WHERE product_id = ? AND status IN ('PENDING', 'CONFIRMED')",
        )
        .bind(product.id)
        .fetch_one(&mut *tx)
        .await?;
        if active + req.quantity > limit {
            return Err(CheckoutError::PreorderLimitExceeded {
                limit,
                requested: req.quantity,
                remaining: (limit - active).max(0),
            });
        }
    }

    // 5. One active preorder per user + product + variant
    let duplicate: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM preorder WHERE user_id = ?1 AND product_id = ?2 AND COALESCE(product_variant_id, 0) = COALESCE(?3, 0) AND status IN ('PENDING', 'CONFIRMED')",
    )
    .bind(user_id)
    .bind(product.id)
    .bind(req.product_variant_id)
    .fetch_one(&mut *tx)
    .await?;
    if duplicate > 0 {
        return Err(CheckoutError::DuplicatePreorder {
            product_id: product.id,
        });
    }

    // 6. A supplied shipping address must belong to the caller
    if let Some(address_id) = req.shipping_address_id {
        let owned: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM address WHERE id = ?1 AND user_id = ?2")
                .bind(address_id)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if owned == 0 {
            return Err(CheckoutError::AddressNotFound { address_id });
        }
    }

    // 10. Persist + bump the product's running preorder counter atomically.
    //     The partial unique index backstops the duplicate rule.
    sqlx::query(
        "INSERT INTO preorder (id, user_id, product_id, product_variant_id, quantity, price, total_amount, deposit_paid, remaining_amount, status, expected_date, shipping_address_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
    )
    .bind(preorder_id)
    .bind(user_id)
    .bind(product.id)
    .bind(req.product_variant_id)
    .bind(req.quantity)
    .bind(price)
    .bind(total_amount)
    .bind(deposit_paid)
    .bind(remaining_amount)
    .bind(status)
    .bind(product.expected_stock_date)
    .bind(req.shipping_address_id)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return CheckoutError::DuplicatePreorder {
                product_id: product.id,
            };
        }
        CheckoutError::Db(e)
    })?;

    sqlx::query(
        "UPDATE product SET preorder_count = preorder_count + ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(req.quantity)
    .bind(now)
    .bind(product.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        preorder_id,
        user_id,
        product_id = product.id,
        quantity = req.quantity,
        deposit_paid,
        "Preorder placed"
    );

    repository::preorder::find_by_id(pool, preorder_id)
        .await?
        .ok_or(CheckoutError::PreorderNotFound { preorder_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{
        inventory_quantity, seed_address, seed_preorder_product, seed_product, seed_user,
        seed_variant, test_pool,
    };

    fn req(product_id: i64, quantity: i64, deposit: Option<f64>) -> PreorderCreate {
        PreorderCreate {
            product_id,
            product_variant_id: None,
            quantity,
            shipping_address_id: None,
            deposit_amount: deposit,
        }
    }

    async fn preorder_count(pool: &SqlitePool, product_id: i64) -> i64 {
        sqlx::query_scalar("SELECT preorder_count FROM product WHERE id = ?")
            .bind(product_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_deposit_scenario() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id =
            seed_preorder_product(&pool, 10, Some(139.99), Some(100), None).await;

        let preorder = place_preorder(&pool, user_id, req(product_id, 2, Some(10.0)))
            .await
            .unwrap();

        assert_eq!(preorder.price, 139.99);
        assert_eq!(preorder.total_amount, 279.98);
        assert_eq!(preorder.deposit_paid, 10.0);
        assert_eq!(preorder.remaining_amount, 269.98);
        assert_eq!(preorder.status, PreorderStatus::Confirmed);
        assert_eq!(preorder_count(&pool, product_id).await, 2);
    }

    #[tokio::test]
    async fn test_no_deposit_stays_pending() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_preorder_product(&pool, 10, Some(139.99), None, None).await;

        let preorder = place_preorder(&pool, user_id, req(product_id, 1, None))
            .await
            .unwrap();
        assert_eq!(preorder.status, PreorderStatus::Pending);
        assert_eq!(preorder.deposit_paid, 0.0);
        assert_eq!(preorder.remaining_amount, 139.99);
    }

    #[tokio::test]
    async fn test_deposit_clamped_to_total() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_preorder_product(&pool, 10, Some(100.0), None, None).await;

        let preorder = place_preorder(&pool, user_id, req(product_id, 1, Some(500.0)))
            .await
            .unwrap();
        assert_eq!(preorder.deposit_paid, 100.0);
        assert_eq!(preorder.remaining_amount, 0.0);
    }

    #[tokio::test]
    async fn test_price_falls_back_to_base_price() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_preorder_product(&pool, 10, None, None, None).await;

        let preorder = place_preorder(&pool, user_id, req(product_id, 1, None))
            .await
            .unwrap();
        assert_eq!(preorder.price, 99.99);
    }

    #[tokio::test]
    async fn test_preorder_not_allowed() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        // Plain product: allow_preorder = 0
        let plain = seed_product(&pool, 10, "Widget", 9.99).await;

        let err = place_preorder(&pool, user_id, req(plain, 1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PreorderNotAllowed { .. }));

        // Missing product reads the same way
        let err = place_preorder(&pool, user_id, req(999, 1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PreorderNotAllowed { .. }));
    }

    #[tokio::test]
    async fn test_window_closed() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let past = shared::util::now_millis() - 1_000;
        let product_id = seed_preorder_product(&pool, 10, None, None, Some(past)).await;

        let err = place_preorder(&pool, user_id, req(product_id, 1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PreorderWindowClosed { .. }));
    }

    #[tokio::test]
    async fn test_limit_boundaries() {
        let pool = test_pool().await;
        let product_id = seed_preorder_product(&pool, 10, None, Some(100), None).await;

        // Existing active preorders summing to 90
        let (first, _) = seed_user(&pool, 1, "first@b.com").await;
        place_preorder(&pool, first, req(product_id, 90, None))
            .await
            .unwrap();

        // 90 + 11 > 100 → rejected, remaining capacity reported as 10
        let (second, _) = seed_user(&pool, 2, "second@b.com").await;
        let err = place_preorder(&pool, second, req(product_id, 11, None))
            .await
            .unwrap_err();
        match err {
            CheckoutError::PreorderLimitExceeded {
                limit,
                requested,
                remaining,
            } => {
                assert_eq!(limit, 100);
                assert_eq!(requested, 11);
                assert_eq!(remaining, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Exactly 10 fits
        place_preorder(&pool, second, req(product_id, 10, None))
            .await
            .unwrap();

        // And now the cap is full
        let (third, _) = seed_user(&pool, 3, "third@b.com").await;
        let err = place_preorder(&pool, third, req(product_id, 1, None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::PreorderLimitExceeded { remaining: 0, .. }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_active_preorder_rejected() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_preorder_product(&pool, 10, None, None, None).await;

        place_preorder(&pool, user_id, req(product_id, 1, None))
            .await
            .unwrap();
        let err = place_preorder(&pool, user_id, req(product_id, 1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::DuplicatePreorder { .. }));

        // A different variant of the same product is a different slot
        let variant_id = seed_variant(&pool, 20, product_id, None, 0).await;
        let mut with_variant = req(product_id, 1, None);
        with_variant.product_variant_id = Some(variant_id);
        place_preorder(&pool, user_id, with_variant).await.unwrap();
    }

    #[tokio::test]
    async fn test_variant_must_belong_to_product() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_preorder_product(&pool, 10, None, None, None).await;
        let other = seed_product(&pool, 11, "Other", 5.0).await;
        let foreign_variant = seed_variant(&pool, 20, other, None, 0).await;

        let mut r = req(product_id, 1, None);
        r.product_variant_id = Some(foreign_variant);
        let err = place_preorder(&pool, user_id, r).await.unwrap_err();
        assert!(matches!(err, CheckoutError::VariantNotFound { .. }));
    }

    #[tokio::test]
    async fn test_foreign_address_rejected() {
        let pool = test_pool().await;
        let (alice, _) = seed_user(&pool, 1, "alice@b.com").await;
        let (bob, _) = seed_user(&pool, 2, "bob@b.com").await;
        let bobs_address = seed_address(&pool, 100, bob).await;
        let product_id = seed_preorder_product(&pool, 10, None, None, None).await;

        let mut r = req(product_id, 1, None);
        r.shipping_address_id = Some(bobs_address);
        let err = place_preorder(&pool, alice, r).await.unwrap_err();
        assert!(matches!(err, CheckoutError::AddressNotFound { .. }));

        // Failed placement must not leak into the counter
        assert_eq!(
            sqlx::query_scalar::<_, i64>("SELECT preorder_count FROM product WHERE id = ?")
                .bind(product_id)
                .fetch_one(&pool)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_inventory_untouched() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let product_id = seed_preorder_product(&pool, 10, None, None, None).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 7).await;

        let mut r = req(product_id, 3, None);
        r.product_variant_id = Some(variant_id);
        place_preorder(&pool, user_id, r).await.unwrap();

        assert_eq!(inventory_quantity(&pool, variant_id).await, 7);
    }
}
