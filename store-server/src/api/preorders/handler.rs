//! Preorder API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::checkout;
use crate::core::ServerState;
use crate::db::repository::preorder;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Preorder, PreorderCancel, PreorderCreate, PreorderDetail, PreorderStatus,
    PreorderStatusHistory, StatusUpdate,
};

/// POST /api/preorders - 预购 (押金可选, 不触碰库存)
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<PreorderCreate>,
) -> AppResult<Json<Preorder>> {
    let created = checkout::place_preorder(&state.pool, current_user.id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(created))
}

/// GET /api/preorders - 自己的预购 (管理员: 全部)
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Preorder>>> {
    let preorders = if current_user.is_admin() {
        preorder::find_all(&state.pool).await
    } else {
        preorder::find_all_for_user(&state.pool, current_user.id).await
    }
    .map_err(AppError::from)?;
    Ok(Json(preorders))
}

/// GET /api/preorders/:id - 预购详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Preorder>> {
    let found = preorder::find_for_user(&state.pool, id, owner_scope(&current_user))
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(shared::ErrorCode::PreorderNotFound))?;
    Ok(Json(found))
}

/// POST /api/preorders/:id/cancel - 取消预购 (含退款信息)
pub async fn cancel(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PreorderCancel>,
) -> AppResult<Json<PreorderDetail>> {
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    let detail = checkout::cancel_preorder(
        &state.pool,
        owner_scope(&current_user),
        id,
        payload,
        current_user.id,
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(detail))
}

/// PUT /api/preorders/:id/status - 状态流转 (管理员)
pub async fn update_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdate<PreorderStatus>>,
) -> AppResult<Json<Preorder>> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    let updated = checkout::update_preorder_status(
        &state.pool,
        id,
        payload.status,
        payload.notes,
        current_user.id,
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(updated))
}

/// GET /api/preorders/:id/history - 状态变更历史
pub async fn history(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<PreorderStatusHistory>>> {
    preorder::find_for_user(&state.pool, id, owner_scope(&current_user))
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(shared::ErrorCode::PreorderNotFound))?;
    let history = preorder::find_history(&state.pool, id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(history))
}

fn owner_scope(user: &CurrentUser) -> Option<i64> {
    if user.is_admin() { None } else { Some(user.id) }
}
