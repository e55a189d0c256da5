//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::checkout::money;
use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Inventory, InventorySet, Product, ProductCreate, ProductDetail, ProductUpdate, ProductVariant,
    VariantCreate, VariantUpdate, VariantWithInventory,
};

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

/// GET /api/products?q=xxx - 商品列表 / 搜索 (公开)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_all(&state.pool, query.q.as_deref())
        .await
        .map_err(AppError::from)?;
    Ok(Json(products))
}

/// GET /api/products/:id - 商品详情 (含规格与库存, 公开)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductDetail>> {
    let detail = product::find_detail(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .filter(|d| d.product.is_active)
        .ok_or_else(|| AppError::new(shared::ErrorCode::ProductNotFound))?;
    Ok(Json(detail))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    money::validate_amount(payload.base_price, "base_price").map_err(AppError::from)?;
    if let Some(p) = payload.preorder_price {
        money::validate_amount(p, "preorder_price").map_err(AppError::from)?;
    }
    if let Some(limit) = payload.preorder_limit
        && limit < 0
    {
        return Err(AppError::validation("preorder_limit must be >= 0"));
    }

    let created = product::create(&state.pool, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(created))
}

/// PUT /api/products/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(p) = payload.base_price {
        money::validate_amount(p, "base_price").map_err(AppError::from)?;
    }
    if let Some(p) = payload.preorder_price {
        money::validate_amount(p, "preorder_price").map_err(AppError::from)?;
    }

    let updated = product::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(updated))
}

/// DELETE /api/products/:id - 下架商品 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = product::delete(&state.pool, id)
        .await
        .map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::new(shared::ErrorCode::ProductNotFound));
    }
    Ok(Json(true))
}

/// POST /api/products/:id/variants - 创建规格
pub async fn create_variant(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<VariantCreate>,
) -> AppResult<Json<VariantWithInventory>> {
    validate_required_text(&payload.sku, "sku", MAX_NAME_LEN)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    if let Some(p) = payload.price {
        money::validate_amount(p, "price").map_err(AppError::from)?;
    }
    if payload.initial_quantity.unwrap_or(0) < 0 {
        return Err(AppError::validation("initial_quantity must be >= 0"));
    }

    // Product must exist and be active
    product::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::new(shared::ErrorCode::ProductNotFound))?;

    let created = product::create_variant(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(created))
}

/// PUT /api/products/:id/variants/:variant_id - 更新规格
pub async fn update_variant(
    State(state): State<ServerState>,
    Path((id, variant_id)): Path<(i64, i64)>,
    Json(payload): Json<VariantUpdate>,
) -> AppResult<Json<ProductVariant>> {
    if let Some(p) = payload.price {
        money::validate_amount(p, "price").map_err(AppError::from)?;
    }
    ensure_variant_of_product(&state, id, variant_id).await?;
    let updated = product::update_variant(&state.pool, variant_id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(updated))
}

/// DELETE /api/products/:id/variants/:variant_id - 删除规格 (软删除)
pub async fn delete_variant(
    State(state): State<ServerState>,
    Path((id, variant_id)): Path<(i64, i64)>,
) -> AppResult<Json<bool>> {
    ensure_variant_of_product(&state, id, variant_id).await?;
    let deleted = product::delete_variant(&state.pool, variant_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(deleted))
}

/// PUT /api/products/:id/variants/:variant_id/inventory - 设置库存 (补货)
pub async fn set_inventory(
    State(state): State<ServerState>,
    Path((id, variant_id)): Path<(i64, i64)>,
    Json(payload): Json<InventorySet>,
) -> AppResult<Json<Inventory>> {
    ensure_variant_of_product(&state, id, variant_id).await?;
    let inventory = product::set_inventory(&state.pool, variant_id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(inventory))
}

async fn ensure_variant_of_product(
    state: &ServerState,
    product_id: i64,
    variant_id: i64,
) -> AppResult<()> {
    product::find_variant(&state.pool, variant_id)
        .await
        .map_err(AppError::from)?
        .filter(|v| v.product_id == product_id)
        .ok_or_else(|| AppError::new(shared::ErrorCode::VariantNotFound))?;
    Ok(())
}
