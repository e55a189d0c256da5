//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_password};
use crate::utils::{AppError, AppResult};
use shared::models::{ProfileUpdate, User, UserUpdate};

/// GET /api/users - 获取所有用户 (管理员)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    let users = user::find_all(&state.pool).await.map_err(AppError::from)?;
    Ok(Json(users))
}

/// GET /api/users/:id - 获取单个用户 (管理员)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = user::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(shared::ErrorCode::UserNotFound))?;
    Ok(Json(user))
}

/// PUT /api/users/:id - 更新角色/启用状态 (管理员)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    if let Some(ref role) = payload.role
        && role != shared::models::ROLE_ADMIN
        && role != shared::models::ROLE_CUSTOMER
    {
        return Err(AppError::validation(format!("unknown role: {role}")));
    }
    let user = user::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(user))
}

/// PUT /api/users/profile - 更新个人资料 (姓名/密码)
pub async fn update_profile(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;

    let password_hash = match payload.password.as_deref() {
        Some(new_password) => {
            validate_password(new_password)?;
            Some(
                password::hash_password(new_password)
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?,
            )
        }
        None => None,
    };

    let user = user::update_profile(&state.pool, current_user.id, payload, password_hash)
        .await
        .map_err(AppError::from)?;
    Ok(Json(user))
}
