//! User Model

use serde::{Deserialize, Serialize};

/// User roles understood by the permission layer
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Argon2 hash; never serialized in responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegister {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Admin-side update payload (role / active flag)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Self-service profile update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: token + basic identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}
