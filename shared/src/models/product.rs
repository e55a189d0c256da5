//! Product & Variant Models

use serde::{Deserialize, Serialize};

/// Stock display status
///
/// Derived data for the storefront; the authoritative quantity lives in
/// the inventory table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
    Preorder,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Base price in currency unit; variants may override
    pub base_price: f64,
    pub stock_status: StockStatus,
    pub allow_preorder: bool,
    /// Preorder unit price; falls back to base_price when unset
    pub preorder_price: Option<f64>,
    /// Cap on cumulative active preordered units; None = uncapped
    pub preorder_limit: Option<i64>,
    /// Running count of active (pending/confirmed) preordered units
    pub preorder_count: i64,
    /// Expected restock date (epoch millis); preorder window closes once passed
    pub expected_stock_date: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub base_price: f64,
    pub stock_status: Option<StockStatus>,
    pub allow_preorder: Option<bool>,
    pub preorder_price: Option<f64>,
    pub preorder_limit: Option<i64>,
    pub expected_stock_date: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<f64>,
    pub stock_status: Option<StockStatus>,
    pub allow_preorder: Option<bool>,
    pub preorder_price: Option<f64>,
    pub preorder_limit: Option<i64>,
    pub expected_stock_date: Option<i64>,
    pub is_active: Option<bool>,
}

/// Product variant entity (color/size combination with its own inventory)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    /// Unit price override; None = product base_price applies
    pub price: Option<f64>,
    pub stock_status: StockStatus,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProductVariant {
    /// Effective unit price given the owning product's base price
    pub fn effective_price(&self, base_price: f64) -> f64 {
        self.price.unwrap_or(base_price)
    }
}

/// Create variant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantCreate {
    pub sku: String,
    pub name: String,
    pub price: Option<f64>,
    pub stock_status: Option<StockStatus>,
    /// Opening stock level for the variant's inventory record
    pub initial_quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
}

/// Update variant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock_status: Option<StockStatus>,
    pub is_active: Option<bool>,
}

/// Variant with its inventory record flattened (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VariantWithInventory {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    pub price: Option<f64>,
    pub stock_status: StockStatus,
    pub is_active: bool,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub low_stock_threshold: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Product with variants + inventory expanded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<VariantWithInventory>,
}
