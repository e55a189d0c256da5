//! Preorder Models
//!
//! A preorder is a reservation of future stock with partial-payment
//! (deposit) support. It never touches inventory; fulfillment converts it
//! through its own status machine.

use serde::{Deserialize, Serialize};

/// Preorder lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PreorderStatus {
    #[default]
    Pending,
    Confirmed,
    Ready,
    Shipped,
    Delivered,
    Cancelled,
    Expired,
}

impl PreorderStatus {
    /// Allowed forward transitions from this status
    ///
    /// DELIVERED, CANCELLED and EXPIRED are terminal.
    pub fn allowed_next(&self) -> &'static [PreorderStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled, Self::Expired],
            Self::Confirmed => &[Self::Ready, Self::Cancelled],
            Self::Ready => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled | Self::Expired => &[],
        }
    }

    pub fn can_transition_to(&self, next: PreorderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Statuses that count against the product's preorder limit and the
    /// one-active-preorder-per-user rule
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether the holder can still cancel
    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(Self::Cancelled)
            && matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Ready => "READY",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }
}

/// Preorder entity
///
/// `price`, `deposit_paid` and `remaining_amount` are snapshots computed
/// at placement; later product price changes do not affect them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Preorder {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub product_variant_id: Option<i64>,
    pub quantity: i64,
    /// Unit price captured at placement
    pub price: f64,
    pub total_amount: f64,
    pub deposit_paid: f64,
    /// total_amount − deposit_paid; zero when fully paid up front
    pub remaining_amount: f64,
    pub status: PreorderStatus,
    pub expected_date: Option<i64>,
    pub shipping_address_id: Option<i64>,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Append-only status transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PreorderStatusHistory {
    pub id: i64,
    pub preorder_id: i64,
    pub from_status: PreorderStatus,
    pub to_status: PreorderStatus,
    pub actor_id: i64,
    pub note: Option<String>,
    pub created_at: i64,
}

/// Place-preorder payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreorderCreate {
    pub product_id: i64,
    pub product_variant_id: Option<i64>,
    pub quantity: i64,
    pub shipping_address_id: Option<i64>,
    pub deposit_amount: Option<f64>,
}

/// Cancel-preorder payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreorderCancel {
    pub reason: Option<String>,
}

/// Refund owed to the holder after cancelling a deposit-backed preorder.
/// Execution is the payment gateway's job; this only surfaces the debt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundInfo {
    pub amount: f64,
    pub status: String,
}

/// Preorder with the computed money summary (placement response)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreorderDetail {
    #[serde(flatten)]
    pub preorder: Preorder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert!(PreorderStatus::Pending.can_transition_to(PreorderStatus::Confirmed));
        assert!(PreorderStatus::Pending.can_transition_to(PreorderStatus::Cancelled));
        assert!(PreorderStatus::Pending.can_transition_to(PreorderStatus::Expired));
        // READY requires going through CONFIRMED first
        assert!(!PreorderStatus::Pending.can_transition_to(PreorderStatus::Ready));
        assert!(!PreorderStatus::Pending.can_transition_to(PreorderStatus::Shipped));
    }

    #[test]
    fn test_confirmed_transitions() {
        assert!(PreorderStatus::Confirmed.can_transition_to(PreorderStatus::Ready));
        assert!(PreorderStatus::Confirmed.can_transition_to(PreorderStatus::Cancelled));
        assert!(!PreorderStatus::Confirmed.can_transition_to(PreorderStatus::Expired));
        assert!(!PreorderStatus::Confirmed.can_transition_to(PreorderStatus::Delivered));
    }

    #[test]
    fn test_fulfillment_chain() {
        assert!(PreorderStatus::Ready.can_transition_to(PreorderStatus::Shipped));
        assert!(PreorderStatus::Ready.can_transition_to(PreorderStatus::Cancelled));
        assert!(PreorderStatus::Shipped.can_transition_to(PreorderStatus::Delivered));
        assert!(!PreorderStatus::Shipped.can_transition_to(PreorderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states() {
        for s in [
            PreorderStatus::Delivered,
            PreorderStatus::Cancelled,
            PreorderStatus::Expired,
        ] {
            assert!(s.is_terminal());
            assert!(s.allowed_next().is_empty());
        }
    }

    #[test]
    fn test_active_statuses() {
        assert!(PreorderStatus::Pending.is_active());
        assert!(PreorderStatus::Confirmed.is_active());
        assert!(!PreorderStatus::Ready.is_active());
        assert!(!PreorderStatus::Cancelled.is_active());
    }

    #[test]
    fn test_cancellable_statuses() {
        assert!(PreorderStatus::Pending.is_cancellable());
        assert!(PreorderStatus::Confirmed.is_cancellable());
        // READY can transition to CANCELLED via admin, but the holder
        // cancel flow only allows PENDING/CONFIRMED
        assert!(!PreorderStatus::Ready.is_cancellable());
        assert!(!PreorderStatus::Delivered.is_cancellable());
    }
}
