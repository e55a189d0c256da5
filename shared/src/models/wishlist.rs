//! Wishlist Model

use serde::{Deserialize, Serialize};

/// Wishlist entry, unique per user + product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WishlistItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub created_at: i64,
}

/// Add-to-wishlist payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistAdd {
    pub product_id: i64,
}

/// Wishlist entry with product context joined in (list views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WishlistLine {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub base_price: f64,
    pub allow_preorder: bool,
    pub is_active: bool,
    pub created_at: i64,
}
