//! Product & Variant Repository

use super::{RepoError, RepoResult};
use shared::models::{
    Inventory, InventorySet, Product, ProductCreate, ProductDetail, ProductUpdate, ProductVariant,
    StockStatus, VariantCreate, VariantUpdate, VariantWithInventory,
};
use sqlx::SqlitePool;

const VARIANT_WITH_INVENTORY_SELECT: &str = "SELECT v.id, v.product_id, v.sku, v.name, v.price, v.stock_status, v.is_active, i.quantity, i.reserved_quantity, i.low_stock_threshold, v.created_at, v.updated_at FROM product_variant v JOIN inventory i ON i.product_variant_id = v.id";

// ── Products ────────────────────────────────────────────────────────

pub async fn find_all(pool: &SqlitePool, search: Option<&str>) -> RepoResult<Vec<Product>> {
    let rows = match search {
        Some(q) => {
            let pattern = format!("%{q}%");
            sqlx::query_as::<_, Product>(
                "SELECT * FROM product WHERE is_active = 1 AND (name LIKE ?1 OR description LIKE ?1) ORDER BY name",
            )
            .bind(pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Product>("SELECT * FROM product WHERE is_active = 1 ORDER BY name")
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Product with variants + inventory expanded
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductDetail>> {
    let Some(product) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let variants = find_variants(pool, id).await?;
    Ok(Some(ProductDetail { product, variants }))
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO product (id, name, description, base_price, stock_status, allow_preorder, preorder_price, preorder_limit, expected_stock_date, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)",
    )
    .bind(id)
    .bind(data.name)
    .bind(data.description)
    .bind(data.base_price)
    .bind(data.stock_status.unwrap_or_default())
    .bind(data.allow_preorder.unwrap_or(false))
    .bind(data.preorder_price)
    .bind(data.preorder_limit)
    .bind(data.expected_stock_date)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), description = COALESCE(?2, description), base_price = COALESCE(?3, base_price), stock_status = COALESCE(?4, stock_status), allow_preorder = COALESCE(?5, allow_preorder), preorder_price = COALESCE(?6, preorder_price), preorder_limit = COALESCE(?7, preorder_limit), expected_stock_date = COALESCE(?8, expected_stock_date), is_active = COALESCE(?9, is_active), updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.base_price)
    .bind(data.stock_status)
    .bind(data.allow_preorder)
    .bind(data.preorder_price)
    .bind(data.preorder_limit)
    .bind(data.expected_stock_date)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Soft delete (deactivate); order/preorder snapshots keep their data
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Variants ────────────────────────────────────────────────────────

pub async fn find_variants(
    pool: &SqlitePool,
    product_id: i64,
) -> RepoResult<Vec<VariantWithInventory>> {
    let sql = format!(
        "{} WHERE v.product_id = ? AND v.is_active = 1 ORDER BY v.name",
        VARIANT_WITH_INVENTORY_SELECT
    );
    let rows = sqlx::query_as::<_, VariantWithInventory>(&sql)
        .bind(product_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_variant(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductVariant>> {
    let row = sqlx::query_as::<_, ProductVariant>("SELECT * FROM product_variant WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create a variant with its inventory record, atomically (1:1 invariant).
pub async fn create_variant(
    pool: &SqlitePool,
    product_id: i64,
    data: VariantCreate,
) -> RepoResult<VariantWithInventory> {
    let now = shared::util::now_millis();
    let variant_id = shared::util::snowflake_id();
    let inventory_id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO product_variant (id, product_id, sku, name, price, stock_status, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(variant_id)
    .bind(product_id)
    .bind(&data.sku)
    .bind(data.name)
    .bind(data.price)
    .bind(data.stock_status.unwrap_or_default())
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("SKU {}", data.sku)),
        other => other,
    })?;

    sqlx::query(
        "INSERT INTO inventory (id, product_variant_id, quantity, reserved_quantity, low_stock_threshold, updated_at) VALUES (?1, ?2, ?3, 0, ?4, ?5)",
    )
    .bind(inventory_id)
    .bind(variant_id)
    .bind(data.initial_quantity.unwrap_or(0))
    .bind(data.low_stock_threshold.unwrap_or(5))
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let sql = format!("{} WHERE v.id = ?", VARIANT_WITH_INVENTORY_SELECT);
    sqlx::query_as::<_, VariantWithInventory>(&sql)
        .bind(variant_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create variant".into()))
}

pub async fn update_variant(
    pool: &SqlitePool,
    id: i64,
    data: VariantUpdate,
) -> RepoResult<ProductVariant> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product_variant SET sku = COALESCE(?1, sku), name = COALESCE(?2, name), price = COALESCE(?3, price), stock_status = COALESCE(?4, stock_status), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.sku)
    .bind(data.name)
    .bind(data.price)
    .bind(data.stock_status)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Variant {id} not found")));
    }
    find_variant(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Variant {id} not found")))
}

pub async fn delete_variant(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product_variant SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Inventory ───────────────────────────────────────────────────────

pub async fn find_inventory(
    pool: &SqlitePool,
    variant_id: i64,
) -> RepoResult<Option<Inventory>> {
    let row =
        sqlx::query_as::<_, Inventory>("SELECT * FROM inventory WHERE product_variant_id = ?")
            .bind(variant_id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

/// Absolute restock: set quantity (and threshold), refresh the variant's
/// display stock status from the new level.
pub async fn set_inventory(
    pool: &SqlitePool,
    variant_id: i64,
    data: InventorySet,
) -> RepoResult<Inventory> {
    if data.quantity < 0 {
        return Err(RepoError::Validation("quantity must be >= 0".into()));
    }
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE inventory SET quantity = ?1, low_stock_threshold = COALESCE(?2, low_stock_threshold), updated_at = ?3 WHERE product_variant_id = ?4",
    )
    .bind(data.quantity)
    .bind(data.low_stock_threshold)
    .bind(now)
    .bind(variant_id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Inventory for variant {variant_id} not found"
        )));
    }

    let threshold: i64 =
        sqlx::query_scalar("SELECT low_stock_threshold FROM inventory WHERE product_variant_id = ?")
            .bind(variant_id)
            .fetch_one(&mut *tx)
            .await?;

    let status = if data.quantity == 0 {
        StockStatus::OutOfStock
    } else if data.quantity <= threshold {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    };
    sqlx::query("UPDATE product_variant SET stock_status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(variant_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_inventory(pool, variant_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to update inventory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{seed_product, test_pool};

    #[tokio::test]
    async fn test_variant_create_includes_inventory() {
        let pool = test_pool().await;
        let product_id = seed_product(&pool, 10, "Widget", 9.99).await;

        let variant = create_variant(
            &pool,
            product_id,
            VariantCreate {
                sku: "W-RED-L".into(),
                name: "Red / L".into(),
                price: Some(12.49),
                stock_status: None,
                initial_quantity: Some(25),
                low_stock_threshold: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(variant.quantity, 25);
        assert_eq!(variant.price, Some(12.49));

        let detail = find_detail(&pool, product_id).await.unwrap().unwrap();
        assert_eq!(detail.variants.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let pool = test_pool().await;
        let product_id = seed_product(&pool, 10, "Widget", 9.99).await;
        let data = VariantCreate {
            sku: "W-RED-L".into(),
            name: "Red / L".into(),
            price: None,
            stock_status: None,
            initial_quantity: None,
            low_stock_threshold: None,
        };
        create_variant(&pool, product_id, data.clone()).await.unwrap();
        let err = create_variant(&pool, product_id, data).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_set_inventory_refreshes_stock_status() {
        let pool = test_pool().await;
        let product_id = seed_product(&pool, 10, "Widget", 9.99).await;
        let variant = create_variant(
            &pool,
            product_id,
            VariantCreate {
                sku: "W-1".into(),
                name: "One".into(),
                price: None,
                stock_status: None,
                initial_quantity: Some(50),
                low_stock_threshold: Some(5),
            },
        )
        .await
        .unwrap();

        set_inventory(
            &pool,
            variant.id,
            InventorySet {
                quantity: 0,
                low_stock_threshold: None,
            },
        )
        .await
        .unwrap();
        let v = find_variant(&pool, variant.id).await.unwrap().unwrap();
        assert_eq!(v.stock_status, StockStatus::OutOfStock);

        set_inventory(
            &pool,
            variant.id,
            InventorySet {
                quantity: 3,
                low_stock_threshold: None,
            },
        )
        .await
        .unwrap();
        let v = find_variant(&pool, variant.id).await.unwrap().unwrap();
        assert_eq!(v.stock_status, StockStatus::LowStock);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_listing() {
        let pool = test_pool().await;
        let id = seed_product(&pool, 10, "Widget", 9.99).await;
        assert_eq!(find_all(&pool, None).await.unwrap().len(), 1);
        assert!(delete(&pool, id).await.unwrap());
        assert!(find_all(&pool, None).await.unwrap().is_empty());
        // Row still exists for snapshots
        assert!(find_by_id(&pool, id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_search_matches_name() {
        let pool = test_pool().await;
        seed_product(&pool, 10, "Mechanical Keyboard", 89.0).await;
        seed_product(&pool, 11, "Mouse", 25.0).await;
        let hits = find_all(&pool, Some("keyboard")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Mechanical Keyboard");
    }
}
