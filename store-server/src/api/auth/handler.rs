//! Authentication Handlers
//!
//! Registration, login, and current-user lookup

use std::time::Duration;

use axum::{Json, extract::State};

use crate::auth::{CurrentUser, password, permissions_for_role};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::validation::{MAX_NAME_LEN, validate_email, validate_password, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{LoginRequest, LoginResponse, ROLE_CUSTOMER, User, UserRegister};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/register - 注册 (同时创建购物车)
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<UserRegister>,
) -> AppResult<Json<LoginResponse>> {
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;
    validate_password(&req.password)?;
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;

    let password_hash = password::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let user = user::create(&state.pool, &email, &password_hash, req.name.trim(), ROLE_CUSTOMER)
        .await
        .map_err(AppError::from)?;

    tracing::info!(user_id = user.id, "User registered");

    issue_token(&state, &user)
}

/// POST /api/auth/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = req.email.trim().to_lowercase();

    let found = user::find_by_email(&state.pool, &email)
        .await
        .map_err(AppError::from)?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message prevents email enumeration
    let user = match found {
        Some(u) => {
            if !u.is_active {
                return Err(AppError::new(shared::ErrorCode::AccountDisabled));
            }

            let password_valid = password::verify_password(&req.password, &u.password_hash)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

            if !password_valid {
                tracing::warn!(email = %email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            tracing::warn!(email = %email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    issue_token(&state, &user)
}

/// GET /api/auth/me - 当前用户
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let user = user::find_by_id(&state.pool, current_user.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(shared::ErrorCode::UserNotFound))?;
    Ok(Json(user))
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<Json<LoginResponse>> {
    let permissions = permissions_for_role(&user.role);
    let token = state
        .jwt_service
        .generate_token(user.id, &user.email, &user.role, &permissions)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.clone(),
    }))
}
