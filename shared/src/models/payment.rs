//! Payment Models
//!
//! Payment records track money owed/received per order. The gateway that
//! actually moves money is an external collaborator; the backend only
//! records outcomes.

use serde::{Deserialize, Serialize};

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    RefundPending,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::RefundPending => "REFUND_PENDING",
            Self::Refunded => "REFUNDED",
            Self::Failed => "FAILED",
        }
    }
}

/// Record a gateway outcome on a payment (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub status: PaymentStatus,
    pub reference: Option<String>,
}

/// Payment record entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub method: String,
    pub status: PaymentStatus,
    /// Gateway reference (charge id, transfer id, ...)
    pub reference: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
