//! Address API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::address;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Address, AddressCreate, AddressUpdate};

fn validate_create(data: &AddressCreate) -> AppResult<()> {
    validate_optional_text(&data.label, "label", MAX_NAME_LEN)?;
    validate_required_text(&data.line1, "line1", MAX_ADDRESS_LEN)?;
    validate_optional_text(&data.line2, "line2", MAX_ADDRESS_LEN)?;
    validate_required_text(&data.city, "city", MAX_NAME_LEN)?;
    validate_required_text(&data.postal_code, "postal_code", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&data.country, "country", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// GET /api/addresses - 获取地址簿
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Address>>> {
    let addresses = address::find_all_for_user(&state.pool, current_user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(addresses))
}

/// GET /api/addresses/:id - 获取单个地址
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Address>> {
    let addr = address::find_for_user(&state.pool, id, current_user.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(shared::ErrorCode::AddressNotFound))?;
    Ok(Json(addr))
}

/// POST /api/addresses - 创建地址
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<AddressCreate>,
) -> AppResult<Json<Address>> {
    validate_create(&payload)?;
    let addr = address::create(&state.pool, current_user.id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(addr))
}

/// PUT /api/addresses/:id - 更新地址
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<AddressUpdate>,
) -> AppResult<Json<Address>> {
    validate_optional_text(&payload.label, "label", MAX_NAME_LEN)?;
    validate_optional_text(&payload.line1, "line1", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.line2, "line2", MAX_ADDRESS_LEN)?;
    let addr = address::update(&state.pool, id, current_user.id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(addr))
}

/// DELETE /api/addresses/:id - 删除地址
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = address::delete(&state.pool, id, current_user.id)
        .await
        .map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::new(shared::ErrorCode::AddressNotFound));
    }
    Ok(Json(true))
}
