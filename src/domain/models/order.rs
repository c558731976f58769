//! Order model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::product::Product;
use super::query_key::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Refunded,
    PartiallyRefunded,
}

impl OrderStatus {
    /// Human-readable label used in tables.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pending => "Pending payment",
            Self::Paid => "Paid",
            Self::Refunded => "Refunded",
            Self::PartiallyRefunded => "Partially Refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A one-off purchase or a subscription renewal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub billing_reason: String,
    #[serde(default)]
    pub subtotal_amount: i64,
    #[serde(default)]
    pub discount_amount: i64,
    #[serde(default)]
    pub net_amount: i64,
    #[serde(default)]
    pub tax_amount: i64,
    #[serde(default)]
    pub total_amount: i64,
    #[serde(default)]
    pub refunded_amount: i64,
    pub currency: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub is_invoice_generated: bool,
    pub product: Product,
}

impl Order {
    /// Refunds are possible while part of the net amount is still unrefunded.
    pub const fn can_refund(&self) -> bool {
        self.paid && self.refunded_amount < self.net_amount
    }

    /// Amount still available for refunding.
    pub const fn refundable_amount(&self) -> i64 {
        let remaining = self.net_amount - self.refunded_amount;
        if remaining > 0 {
            remaining
        } else {
            0
        }
    }

    /// `subscription_cycle` → `subscription cycle`.
    pub fn billing_reason_label(&self) -> String {
        self.billing_reason.split('_').collect::<Vec<_>>().join(" ")
    }
}

impl Entity for Order {
    const KIND: ResourceKind = ResourceKind::Orders;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.product.organization_id
    }
}
