//! Cart Models

use serde::{Deserialize, Serialize};

/// Cart entity: exactly one per user, created at registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cart line item
///
/// `price` is captured when the item is added, not re-read at checkout.
/// The same (product, variant, preorder flag) combination merges
/// quantities instead of duplicating rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub product_variant_id: Option<i64>,
    pub quantity: i64,
    pub price: f64,
    pub is_preorder: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemAdd {
    pub product_id: i64,
    pub product_variant_id: Option<i64>,
    pub quantity: i64,
    /// Add the line as a preorder reservation instead of a stock purchase
    #[serde(default)]
    pub is_preorder: bool,
}

/// Quantity update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemUpdate {
    pub quantity: i64,
}

/// Cart line with product/variant/inventory context joined in
/// (list views and the order placement workflow)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_variant_id: Option<i64>,
    pub variant_name: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub is_preorder: bool,
    /// Current inventory quantity for the variant; None when the line has
    /// no variant (or the variant has no inventory record)
    pub available: Option<i64>,
}

/// Cart with lines expanded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartDetail {
    #[serde(flatten)]
    pub cart: Cart,
    pub items: Vec<CartLine>,
    pub subtotal: f64,
}
