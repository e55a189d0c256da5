//! Wishlist API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::wishlist;
use crate::utils::{AppError, AppResult};
use shared::models::{WishlistAdd, WishlistItem, WishlistLine};

/// GET /api/wishlist - 心愿单
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<WishlistLine>>> {
    let lines = wishlist::find_all_for_user(&state.pool, current_user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(lines))
}

/// POST /api/wishlist - 加入心愿单
pub async fn add(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<WishlistAdd>,
) -> AppResult<Json<WishlistItem>> {
    let item = wishlist::add(&state.pool, current_user.id, payload.product_id)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::Duplicate(_) => {
                AppError::new(shared::ErrorCode::WishlistItemExists)
            }
            other => other.into(),
        })?;
    Ok(Json(item))
}

/// DELETE /api/wishlist/:product_id - 移出心愿单
pub async fn remove(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(product_id): Path<i64>,
) -> AppResult<Json<bool>> {
    let removed = wishlist::remove(&state.pool, current_user.id, product_id)
        .await
        .map_err(AppError::from)?;
    if !removed {
        return Err(AppError::new(shared::ErrorCode::WishlistItemNotFound));
    }
    Ok(Json(true))
}
