//! Order API Handlers
//!
//! Thin wrappers over the checkout workflows plus the read endpoints.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::checkout;
use crate::core::ServerState;
use crate::db::repository::{order, payment};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Order, OrderCreate, OrderDetail, OrderStatus, OrderStatusHistory, Payment, PaymentUpdate,
    StatusUpdate,
};

/// POST /api/orders - 下单 (原子: 创建订单+扣库存+清空购物车)
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderDetail>> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    let detail = checkout::place_order(&state.pool, current_user.id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(detail))
}

/// GET /api/orders - 自己的订单 (管理员: 全部订单)
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = if current_user.is_admin() {
        order::find_all(&state.pool).await
    } else {
        order::find_all_for_user(&state.pool, current_user.id).await
    }
    .map_err(AppError::from)?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - 订单详情 (含条目与地址)
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let found = order::find_for_user(&state.pool, id, owner_scope(&current_user))
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(shared::ErrorCode::OrderNotFound))?;
    let detail = order::expand(&state.pool, found)
        .await
        .map_err(AppError::from)?;
    Ok(Json(detail))
}

/// POST /api/orders/:id/cancel - 取消订单 (恢复库存)
pub async fn cancel(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = checkout::cancel_order(
        &state.pool,
        owner_scope(&current_user),
        id,
        current_user.id,
        None,
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(detail))
}

/// PUT /api/orders/:id/status - 状态流转 (管理员)
pub async fn update_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdate<OrderStatus>>,
) -> AppResult<Json<OrderDetail>> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    let detail = checkout::update_order_status(
        &state.pool,
        id,
        payload.status,
        payload.tracking_number,
        payload.notes,
        current_user.id,
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(detail))
}

/// GET /api/orders/:id/payments - 订单支付记录
pub async fn payments(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Payment>>> {
    ensure_visible(&state, &current_user, id).await?;
    let payments = payment::find_by_order(&state.pool, id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(payments))
}

/// PUT /api/orders/:id/payments/:payment_id - 记录支付网关结果 (管理员)
pub async fn update_payment(
    State(state): State<ServerState>,
    Path((id, payment_id)): Path<(i64, i64)>,
    Json(payload): Json<PaymentUpdate>,
) -> AppResult<Json<Payment>> {
    // The payment must belong to the order in the path
    payment::find_by_id(&state.pool, payment_id)
        .await
        .map_err(AppError::from)?
        .filter(|p| p.order_id == id)
        .ok_or_else(|| AppError::new(shared::ErrorCode::PaymentNotFound))?;

    let updated = payment::update_status(&state.pool, payment_id, payload.status, payload.reference)
        .await
        .map_err(AppError::from)?;
    Ok(Json(updated))
}

/// GET /api/orders/:id/history - 状态变更历史
pub async fn history(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<OrderStatusHistory>>> {
    ensure_visible(&state, &current_user, id).await?;
    let history = order::find_history(&state.pool, id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(history))
}

fn owner_scope(user: &CurrentUser) -> Option<i64> {
    if user.is_admin() { None } else { Some(user.id) }
}

async fn ensure_visible(state: &ServerState, user: &CurrentUser, order_id: i64) -> AppResult<()> {
    order::find_for_user(&state.pool, order_id, owner_scope(user))
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(shared::ErrorCode::OrderNotFound))?;
    Ok(())
}
