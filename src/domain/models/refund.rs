//! Refund model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::query_key::{QueryParams, ResourceKind, ORDER_PARAM};
use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    Duplicate,
    Fraudulent,
    CustomerRequest,
    ServiceDisruption,
    SatisfactionGuarantee,
    Other,
}

impl RefundReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::Fraudulent => "fraudulent",
            Self::CustomerRequest => "customer_request",
            Self::ServiceDisruption => "service_disruption",
            Self::SatisfactionGuarantee => "satisfaction_guarantee",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RefundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "duplicate" => Ok(Self::Duplicate),
            "fraudulent" => Ok(Self::Fraudulent),
            "customer_request" => Ok(Self::CustomerRequest),
            "service_disruption" => Ok(Self::ServiceDisruption),
            "satisfaction_guarantee" => Ok(Self::SatisfactionGuarantee),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown refund reason: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        };
        f.write_str(label)
    }
}

/// A refund issued against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub status: RefundStatus,
    pub reason: RefundReason,
    pub amount: i64,
    #[serde(default)]
    pub tax_amount: i64,
    pub currency: String,
    pub order_id: String,
    pub organization_id: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub revoke_benefits: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Refund {
    const KIND: ResourceKind = ResourceKind::Refunds;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.organization_id
    }

    // Refund lists are fetched per order.
    fn list_selector(&self) -> QueryParams {
        QueryParams::new().with(ORDER_PARAM, self.order_id.as_str())
    }
}

/// Body of `POST /v1/refunds/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundCreate {
    pub order_id: String,
    pub reason: RefundReason,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub revoke_benefits: bool,
}

impl RefundCreate {
    pub fn validate(&self) -> DomainResult<()> {
        if self.order_id.trim().is_empty() {
            return Err(DomainError::Validation("order_id cannot be empty".to_string()));
        }
        if self.amount <= 0 {
            return Err(DomainError::Validation(format!(
                "refund amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refund_lists_are_keyed_by_order() {
        let refund: Refund = serde_json::from_value(serde_json::json!({
            "id": "ref_1",
            "status": "succeeded",
            "reason": "customer_request",
            "amount": 500,
            "currency": "usd",
            "order_id": "ord_1",
            "organization_id": "org_1",
            "created_at": "2025-05-21T14:43:00Z"
        }))
        .expect("refund should parse");
        assert_eq!(refund.list_filter().to_string(), "[refunds, {orderId: ord_1}]");
    }

    #[test]
    fn test_refund_create_validation() {
        let mut body = RefundCreate {
            order_id: "ord_1".into(),
            reason: RefundReason::Duplicate,
            amount: 100,
            comment: None,
            revoke_benefits: false,
        };
        assert!(body.validate().is_ok());
        body.amount = 0;
        assert!(body.validate().is_err());
    }
}
