//! Review Model

use serde::{Deserialize, Serialize};

/// Product review entity, one per user + product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    /// 1..=5
    pub rating: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create review payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub product_id: i64,
    pub rating: i64,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Update review payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Review with the author's display name joined in (product page)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReviewWithAuthor {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub product_id: i64,
    pub rating: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
