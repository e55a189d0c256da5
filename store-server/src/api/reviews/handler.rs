//! Review API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{product, review};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};
use shared::models::{Review, ReviewCreate, ReviewUpdate, ReviewWithAuthor};

/// GET /api/reviews/product/:product_id - 商品评价 (公开)
pub async fn list_for_product(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Vec<ReviewWithAuthor>>> {
    let reviews = review::find_by_product(&state.pool, product_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(reviews))
}

/// POST /api/reviews - 创建评价 (每人每商品一条)
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<Json<Review>> {
    validate_optional_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.body, "body", MAX_NOTE_LEN)?;
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::new(shared::ErrorCode::ReviewInvalidRating));
    }

    product::find_by_id(&state.pool, payload.product_id)
        .await
        .map_err(AppError::from)?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::new(shared::ErrorCode::ProductNotFound))?;

    let created = review::create(&state.pool, current_user.id, payload)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::Duplicate(_) => {
                AppError::new(shared::ErrorCode::ReviewExists)
            }
            other => other.into(),
        })?;
    Ok(Json(created))
}

/// PUT /api/reviews/:id - 更新自己的评价
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReviewUpdate>,
) -> AppResult<Json<Review>> {
    validate_optional_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.body, "body", MAX_NOTE_LEN)?;
    let updated = review::update(&state.pool, id, current_user.id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(updated))
}

/// DELETE /api/reviews/:id - 删除自己的评价
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = review::delete(&state.pool, id, current_user.id)
        .await
        .map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::new(shared::ErrorCode::ReviewNotFound));
    }
    Ok(Json(true))
}
