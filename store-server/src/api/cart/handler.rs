//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::checkout::money;
use crate::core::ServerState;
use crate::db::repository::cart;
use crate::utils::{AppError, AppResult};
use shared::models::{CartDetail, CartItem, CartItemAdd, CartItemUpdate};

/// GET /api/cart - 获取购物车 (含行明细与小计)
pub async fn get_cart(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<CartDetail>> {
    let cart_row = cart::find_or_create_for_user(&state.pool, current_user.id)
        .await
        .map_err(AppError::from)?;
    let items = cart::find_lines(&state.pool, cart_row.id)
        .await
        .map_err(AppError::from)?;
    let subtotal = money::order_total(items.iter().map(|l| (l.price, l.quantity)));

    Ok(Json(CartDetail {
        cart: cart_row,
        items,
        subtotal,
    }))
}

/// POST /api/cart/items - 加入购物车 (同行合并数量)
pub async fn add_item(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<CartItemAdd>,
) -> AppResult<Json<CartItem>> {
    money::validate_quantity(payload.quantity).map_err(AppError::from)?;
    let item = cart::add_item(&state.pool, current_user.id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(item))
}

/// PUT /api/cart/items/:item_id - 修改数量
pub async fn update_item(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(item_id): Path<i64>,
    Json(payload): Json<CartItemUpdate>,
) -> AppResult<Json<CartItem>> {
    money::validate_quantity(payload.quantity).map_err(AppError::from)?;
    let item = cart::update_item_quantity(&state.pool, current_user.id, item_id, payload.quantity)
        .await
        .map_err(AppError::from)?;
    Ok(Json(item))
}

/// DELETE /api/cart/items/:item_id - 移除单行
pub async fn remove_item(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<bool>> {
    let removed = cart::remove_item(&state.pool, current_user.id, item_id)
        .await
        .map_err(AppError::from)?;
    if !removed {
        return Err(AppError::new(shared::ErrorCode::CartItemNotFound));
    }
    Ok(Json(true))
}

/// DELETE /api/cart - 清空购物车
pub async fn clear(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<u64>> {
    let removed = cart::clear(&state.pool, current_user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(removed))
}
