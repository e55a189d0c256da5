//! Checkout workflows
//!
//! The data-consistency core of the backend: order placement and
//! cancellation, preorder placement and cancellation, and the status
//! state machines. Every multi-step mutation runs inside a single sqlx
//! transaction; SQLite serializes writers, and the stock decrement is
//! additionally guarded so two orders can never jointly oversell a
//! variant.
//!
//! # 模块结构
//!
//! - [`money`] - rust_decimal 金额计算
//! - [`place_order`] / [`cancel_order`] - 订单下单与取消
//! - [`place_preorder`] / [`cancel_preorder`] - 预购下单与取消
//! - [`transition`] - 状态机驱动的状态变更 (含历史记录)

pub mod cancel_order;
pub mod cancel_preorder;
pub mod money;
pub mod place_order;
pub mod place_preorder;
pub mod transition;

pub use cancel_order::cancel_order;
pub use cancel_preorder::cancel_preorder;
pub use place_order::place_order;
pub use place_preorder::place_preorder;
pub use transition::{update_order_status, update_preorder_status};

use shared::error::AppError;
use shared::models::{CartLine, OrderStatus, PreorderStatus};
use thiserror::Error;

use crate::db::repository::RepoError;

/// Typed failures for the checkout workflows
///
/// Each carries enough context for the caller to react programmatically
/// (remaining capacity, available stock, allowed next statuses).
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    #[error("Product {product_id} does not accept preorders")]
    PreorderNotAllowed { product_id: i64 },

    #[error("Variant {variant_id} not found")]
    VariantNotFound { variant_id: i64 },

    #[error("Preorder window closed (expected stock date has passed)")]
    PreorderWindowClosed { expected_date: i64 },

    #[error("Preorder limit {limit} exceeded: requested {requested}, remaining capacity {remaining}")]
    PreorderLimitExceeded {
        limit: i64,
        requested: i64,
        remaining: i64,
    },

    #[error("An active preorder already exists for product {product_id}")]
    DuplicatePreorder { product_id: i64 },

    #[error("Address {address_id} not found")]
    AddressNotFound { address_id: i64 },

    #[error("Order {order_id} not found")]
    OrderNotFound { order_id: i64 },

    #[error("Preorder {preorder_id} not found")]
    PreorderNotFound { preorder_id: i64 },

    #[error("Order status cannot change from {from:?} to {to:?}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },

    #[error("Preorder status cannot change from {from:?} to {to:?}")]
    InvalidPreorderTransition {
        from: PreorderStatus,
        to: PreorderStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        use shared::ErrorCode;
        let message = err.to_string();
        match err {
            CheckoutError::EmptyCart => AppError::new(ErrorCode::CartEmpty),
            CheckoutError::InsufficientStock {
                product,
                requested,
                available,
            } => AppError::with_message(ErrorCode::InsufficientStock, message)
                .with_detail("product", product)
                .with_detail("requested", requested)
                .with_detail("available", available),
            CheckoutError::PreorderNotAllowed { product_id } => {
                AppError::with_message(ErrorCode::PreorderNotAllowed, message)
                    .with_detail("product_id", product_id)
            }
            CheckoutError::VariantNotFound { variant_id } => {
                AppError::with_message(ErrorCode::VariantNotFound, message)
                    .with_detail("variant_id", variant_id)
            }
            CheckoutError::PreorderWindowClosed { expected_date } => {
                AppError::with_message(ErrorCode::PreorderWindowClosed, message)
                    .with_detail("expected_date", expected_date)
            }
            CheckoutError::PreorderLimitExceeded {
                limit,
                requested,
                remaining,
            } => AppError::with_message(ErrorCode::PreorderLimitExceeded, message)
                .with_detail("limit", limit)
                .with_detail("requested", requested)
                .with_detail("remaining", remaining),
            CheckoutError::DuplicatePreorder { product_id } => {
                AppError::with_message(ErrorCode::DuplicatePreorder, message)
                    .with_detail("product_id", product_id)
            }
            CheckoutError::AddressNotFound { address_id } => {
                AppError::with_message(ErrorCode::AddressNotFound, message)
                    .with_detail("address_id", address_id)
            }
            CheckoutError::OrderNotFound { .. } => {
                AppError::with_message(ErrorCode::OrderNotFound, message)
            }
            CheckoutError::PreorderNotFound { .. } => {
                AppError::with_message(ErrorCode::PreorderNotFound, message)
            }
            CheckoutError::InvalidOrderTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
                    .with_detail(
                        "allowed",
                        from.allowed_next()
                            .iter()
                            .map(|s| s.as_str())
                            .collect::<Vec<_>>(),
                    )
            }
            CheckoutError::InvalidPreorderTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
                    .with_detail(
                        "allowed",
                        from.allowed_next()
                            .iter()
                            .map(|s| s.as_str())
                            .collect::<Vec<_>>(),
                    )
            }
            CheckoutError::Validation(msg) => AppError::validation(msg),
            CheckoutError::Repo(repo) => repo.into(),
            CheckoutError::Db(e) => AppError::database(e.to_string()),
        }
    }
}

/// A cart line tagged by fulfillment kind
///
/// The places where regular and preorder lines diverge (stock check,
/// inventory mutation) match on this exhaustively instead of re-testing
/// the boolean flag.
#[derive(Debug, Clone)]
pub enum LineItem {
    Regular(CartLine),
    Preorder(CartLine),
}

impl LineItem {
    pub fn from_line(line: CartLine) -> Self {
        if line.is_preorder {
            Self::Preorder(line)
        } else {
            Self::Regular(line)
        }
    }

    pub fn line(&self) -> &CartLine {
        match self {
            Self::Regular(l) | Self::Preorder(l) => l,
        }
    }

    pub fn is_preorder(&self) -> bool {
        matches!(self, Self::Preorder(_))
    }

    /// The (variant, quantity) this line holds against inventory.
    ///
    /// Preorder lines never touch inventory; regular lines without a
    /// variant have no stock record to check.
    pub fn stock_demand(&self) -> Option<(i64, i64)> {
        match self {
            Self::Regular(l) => l.product_variant_id.map(|v| (v, l.quantity)),
            Self::Preorder(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(variant: Option<i64>, preorder: bool) -> CartLine {
        CartLine {
            id: 1,
            product_id: 10,
            product_name: "Widget".into(),
            product_variant_id: variant,
            variant_name: None,
            quantity: 2,
            price: 9.99,
            is_preorder: preorder,
            available: Some(5),
        }
    }

    #[test]
    fn test_line_item_tagging() {
        assert!(!LineItem::from_line(line(None, false)).is_preorder());
        assert!(LineItem::from_line(line(None, true)).is_preorder());
    }

    #[test]
    fn test_stock_demand_rules() {
        // Regular line with a variant holds stock
        assert_eq!(
            LineItem::from_line(line(Some(20), false)).stock_demand(),
            Some((20, 2))
        );
        // Regular line without a variant has nothing to check
        assert_eq!(LineItem::from_line(line(None, false)).stock_demand(), None);
        // Preorder lines never touch inventory, variant or not
        assert_eq!(
            LineItem::from_line(line(Some(20), true)).stock_demand(),
            None
        );
    }

    #[test]
    fn test_transition_error_lists_allowed_states() {
        let err: AppError = CheckoutError::InvalidOrderTransition {
            from: shared::models::OrderStatus::Pending,
            to: shared::models::OrderStatus::Shipped,
        }
        .into();
        assert_eq!(err.code, shared::ErrorCode::InvalidStatusTransition);
        let allowed = &err.details.as_ref().unwrap()["allowed"];
        assert_eq!(
            allowed,
            &serde_json::json!(["CONFIRMED", "CANCELLED"])
        );
    }

    #[test]
    fn test_limit_error_carries_remaining_capacity() {
        let err: AppError = CheckoutError::PreorderLimitExceeded {
            limit: 100,
            requested: 11,
            remaining: 10,
        }
        .into();
        assert_eq!(err.code, shared::ErrorCode::PreorderLimitExceeded);
        assert_eq!(err.details.as_ref().unwrap()["remaining"], 10);
    }
}
