//! Inventory Model

use serde::{Deserialize, Serialize};

/// Per-variant inventory record (1:1 with product_variant)
///
/// `quantity` never goes negative: decrements happen only through the
/// guarded update in the order placement transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Inventory {
    pub id: i64,
    pub product_variant_id: i64,
    pub quantity: i64,
    /// Stock held against in-flight demand; carried but not mutated by
    /// the order workflows
    pub reserved_quantity: i64,
    pub low_stock_threshold: i64,
    pub updated_at: i64,
}

/// Absolute inventory set payload (admin restock)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySet {
    pub quantity: i64,
    pub low_stock_threshold: Option<i64>,
}
