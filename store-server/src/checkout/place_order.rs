//! Order placement workflow
//!
//! Validates the cart, checks stock, computes totals, then atomically:
//! creates the order with snapshot items, decrements inventory for
//! regular variant lines, records the pending payment, and empties the
//! cart. Any failure inside the transaction rolls everything back.

use shared::models::{OrderCreate, OrderDetail, OrderType};
use sqlx::SqlitePool;

use super::{CheckoutError, LineItem, money};
use crate::db::repository;

pub async fn place_order(
    pool: &SqlitePool,
    user_id: i64,
    req: OrderCreate,
) -> Result<OrderDetail, CheckoutError> {
    if req.payment_method.trim().is_empty() {
        return Err(CheckoutError::Validation(
            "payment_method must not be empty".into(),
        ));
    }

    // 1. Addresses must belong to the caller (checked before mutating)
    repository::address::find_for_user(pool, req.shipping_address_id, user_id)
        .await?
        .ok_or(CheckoutError::AddressNotFound {
            address_id: req.shipping_address_id,
        })?;
    if let Some(billing_id) = req.billing_address_id {
        repository::address::find_for_user(pool, billing_id, user_id)
            .await?
            .ok_or(CheckoutError::AddressNotFound {
                address_id: billing_id,
            })?;
    }

    // 2. Load the cart with product / variant / inventory context
    let cart = repository::cart::find_by_user(pool, user_id)
        .await?
        .ok_or(CheckoutError::EmptyCart)?;
    let lines = repository::cart::find_lines(pool, cart.id).await?;
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    // 3. Tag lines by fulfillment kind
    let items: Vec<LineItem> = lines.into_iter().map(LineItem::from_line).collect();

    for item in &items {
        money::validate_quantity(item.line().quantity)?;
        money::validate_amount(item.line().price, "price")?;
    }

    // 4. Optimistic stock check; the guarded decrement below re-verifies
    //    inside the transaction
    for item in &items {
        if let Some((_, requested)) = item.stock_demand() {
            let available = item.line().available.unwrap_or(0);
            if available < requested {
                return Err(CheckoutError::InsufficientStock {
                    product: item.line().product_name.clone(),
                    requested,
                    available,
                });
            }
        }
    }

    // 5. Totals from captured prices, decimal arithmetic
    let total_amount = money::order_total(items.iter().map(|i| (i.line().price, i.line().quantity)));

    // 6. Order-level fulfillment flag (PREORDER even for mixed carts)
    let order_type = if items.iter().any(|i| i.is_preorder()) {
        OrderType::Preorder
    } else {
        OrderType::Regular
    };

    // 7. Human-facing order number; the UNIQUE constraint is authoritative
    let order_number = shared::util::order_number();

    let now = shared::util::now_millis();
    let order_id = shared::util::snowflake_id();

    // 8. One atomic transaction: order + items + decrements + payment + cart clear
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, user_id, order_number, status, payment_status, payment_method, order_type, total_amount, shipping_address_id, billing_address_id, notes, created_at, updated_at) VALUES (?1, ?2, ?3, 'PENDING', 'PENDING', ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(order_id)
    .bind(user_id)
    .bind(&order_number)
    .bind(&req.payment_method)
    .bind(order_type)
    .bind(total_amount)
    .bind(req.shipping_address_id)
    .bind(req.billing_address_id)
    .bind(&req.notes)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for item in &items {
        let line = item.line();
        sqlx::query(
            "INSERT INTO order_item (id, order_id, product_id, product_variant_id, product_name, quantity, price, total, is_preorder, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(shared::util::snowflake_id())
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.product_variant_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.price)
        .bind(money::line_total(line.price, line.quantity))
        .bind(item.is_preorder())
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    // Guarded decrement: the WHERE clause re-checks availability so a
    // concurrent order cannot make this oversell. Zero rows = stock moved
    // under us; abort the whole transaction.
    for item in &items {
        if let Some((variant_id, requested)) = item.stock_demand() {
            let updated = sqlx::query(
                "UPDATE inventory SET quantity = quantity - ?1, updated_at = ?2 WHERE product_variant_id = ?3 AND quantity >= ?1",
            )
            .bind(requested)
            .bind(now)
            .bind(variant_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                let available: i64 = sqlx::query_scalar(
                    "SELECT quantity FROM inventory WHERE product_variant_id = ?",
                )
                .bind(variant_id)
                .fetch_optional(&mut *tx)
                .await?
                .unwrap_or(0);
                return Err(CheckoutError::InsufficientStock {
                    product: item.line().product_name.clone(),
                    requested,
                    available,
                });
            }
        }
    }

    sqlx::query(
        "INSERT INTO payment (id, order_id, user_id, amount, method, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'PENDING', ?6, ?6)",
    )
    .bind(shared::util::snowflake_id())
    .bind(order_id)
    .bind(user_id)
    .bind(total_amount)
    .bind(&req.payment_method)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM cart_item WHERE cart_id = ?")
        .bind(cart.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        order_number = %order_number,
        user_id,
        total_amount,
        "Order placed"
    );

    // 9. Return the order with items and addresses expanded
    let order = repository::order::find_by_id(pool, order_id)
        .await?
        .ok_or(CheckoutError::OrderNotFound { order_id })?;
    Ok(repository::order::expand(pool, order).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{
        inventory_quantity, seed_address, seed_preorder_product, seed_product, seed_user,
        seed_variant, test_pool,
    };
    use shared::models::{CartItemAdd, OrderStatus, PaymentStatus};

    fn order_req(shipping: i64) -> OrderCreate {
        OrderCreate {
            shipping_address_id: shipping,
            billing_address_id: None,
            payment_method: "card".into(),
            notes: None,
        }
    }

    async fn add_to_cart(
        pool: &SqlitePool,
        user_id: i64,
        product_id: i64,
        variant_id: Option<i64>,
        quantity: i64,
        preorder: bool,
    ) {
        repository::cart::add_item(
            pool,
            user_id,
            CartItemAdd {
                product_id,
                product_variant_id: variant_id,
                quantity,
                is_preorder: preorder,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_regular_order_scenario() {
        let pool = test_pool().await;
        let (user_id, cart_id) = seed_user(&pool, 1, "a@b.com").await;
        let address_id = seed_address(&pool, 100, user_id).await;
        let product_id = seed_product(&pool, 10, "Widget", 21.99).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 5).await;

        add_to_cart(&pool, user_id, product_id, Some(variant_id), 2, false).await;

        let detail = place_order(&pool, user_id, order_req(address_id))
            .await
            .unwrap();

        assert_eq!(detail.order.total_amount, 43.98);
        assert_eq!(detail.order.order_type, OrderType::Regular);
        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].total, 43.98);
        assert!(detail.order.order_number.starts_with("ORD-"));
        assert_eq!(
            detail.shipping_address.as_ref().unwrap().id,
            address_id
        );

        // Stock decremented 5 → 3
        assert_eq!(inventory_quantity(&pool, variant_id).await, 3);

        // Cart emptied
        let lines = repository::cart::find_lines(&pool, cart_id).await.unwrap();
        assert!(lines.is_empty());

        // Pending payment recorded for the full amount
        let payments = repository::payment::find_by_order(&pool, detail.order.id)
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, 43.98);
        assert_eq!(payments[0].status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let address_id = seed_address(&pool, 100, user_id).await;

        let err = place_order(&pool, user_id, order_req(address_id))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_insufficient_stock_names_product_and_rolls_back() {
        let pool = test_pool().await;
        let (user_id, cart_id) = seed_user(&pool, 1, "a@b.com").await;
        let address_id = seed_address(&pool, 100, user_id).await;
        let product_id = seed_product(&pool, 10, "Rare Widget", 21.99).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 1).await;

        add_to_cart(&pool, user_id, product_id, Some(variant_id), 2, false).await;

        let err = place_order(&pool, user_id, order_req(address_id))
            .await
            .unwrap_err();
        match err {
            CheckoutError::InsufficientStock {
                product,
                requested,
                available,
            } => {
                assert_eq!(product, "Rare Widget");
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Nothing was mutated
        assert_eq!(inventory_quantity(&pool, variant_id).await, 1);
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);
        let lines = repository::cart::find_lines(&pool, cart_id).await.unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn test_mixed_cart_is_preorder_type_and_skips_inventory() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let address_id = seed_address(&pool, 100, user_id).await;
        let regular = seed_product(&pool, 10, "Widget", 10.0).await;
        let variant_id = seed_variant(&pool, 20, regular, None, 5).await;
        let preorderable = seed_preorder_product(&pool, 11, Some(50.0), None, None).await;
        let pre_variant = seed_variant(&pool, 21, preorderable, None, 3).await;

        add_to_cart(&pool, user_id, regular, Some(variant_id), 1, false).await;
        add_to_cart(&pool, user_id, preorderable, Some(pre_variant), 2, true).await;

        let detail = place_order(&pool, user_id, order_req(address_id))
            .await
            .unwrap();

        assert_eq!(detail.order.order_type, OrderType::Preorder);
        assert_eq!(detail.order.total_amount, 110.0);
        assert_eq!(detail.items.len(), 2);

        // Regular line decremented, preorder line left inventory alone
        assert_eq!(inventory_quantity(&pool, variant_id).await, 4);
        assert_eq!(inventory_quantity(&pool, pre_variant).await, 3);
    }

    #[tokio::test]
    async fn test_foreign_address_rejected() {
        let pool = test_pool().await;
        let (alice, _) = seed_user(&pool, 1, "alice@b.com").await;
        let (bob, _) = seed_user(&pool, 2, "bob@b.com").await;
        let bobs_address = seed_address(&pool, 100, bob).await;
        let product_id = seed_product(&pool, 10, "Widget", 10.0).await;

        add_to_cart(&pool, alice, product_id, None, 1, false).await;

        let err = place_order(&pool, alice, order_req(bobs_address))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::AddressNotFound { .. }));
    }

    #[tokio::test]
    async fn test_captured_price_survives_product_price_change() {
        let pool = test_pool().await;
        let (user_id, _) = seed_user(&pool, 1, "a@b.com").await;
        let address_id = seed_address(&pool, 100, user_id).await;
        let product_id = seed_product(&pool, 10, "Widget", 21.99).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 5).await;

        add_to_cart(&pool, user_id, product_id, Some(variant_id), 2, false).await;

        // Price hike between add-to-cart and checkout must not leak in
        sqlx::query("UPDATE product SET base_price = 99.99 WHERE id = ?")
            .bind(product_id)
            .execute(&pool)
            .await
            .unwrap();

        let detail = place_order(&pool, user_id, order_req(address_id))
            .await
            .unwrap();
        assert_eq!(detail.order.total_amount, 43.98);
        assert_eq!(detail.items[0].price, 21.99);
    }

    #[tokio::test]
    async fn test_last_unit_sells_exactly_once() {
        let pool = test_pool().await;
        let (alice, _) = seed_user(&pool, 1, "alice@b.com").await;
        let (bob, _) = seed_user(&pool, 2, "bob@b.com").await;
        let alice_addr = seed_address(&pool, 100, alice).await;
        let bob_addr = seed_address(&pool, 101, bob).await;
        let product_id = seed_product(&pool, 10, "Last One", 10.0).await;
        let variant_id = seed_variant(&pool, 20, product_id, None, 1).await;

        add_to_cart(&pool, alice, product_id, Some(variant_id), 1, false).await;
        add_to_cart(&pool, bob, product_id, Some(variant_id), 1, false).await;

        let first = place_order(&pool, alice, order_req(alice_addr)).await;
        let second = place_order(&pool, bob, order_req(bob_addr)).await;

        assert!(first.is_ok());
        assert!(matches!(
            second.unwrap_err(),
            CheckoutError::InsufficientStock { .. }
        ));
        assert_eq!(inventory_quantity(&pool, variant_id).await, 0);
    }
}
