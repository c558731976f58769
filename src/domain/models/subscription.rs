//! Subscription model and its update payloads.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::product::Product;
use super::query_key::{QueryParams, ResourceKind};
use crate::domain::errors::{DomainError, DomainResult};

/// Lifecycle status reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Incomplete,
    IncompleteExpired,
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
}

impl SubscriptionStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Unpaid => "unpaid",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incomplete" => Ok(Self::Incomplete),
            "incomplete_expired" => Ok(Self::IncompleteExpired),
            "trialing" => Ok(Self::Trialing),
            "active" => Ok(Self::Active),
            "past_due" => Ok(Self::PastDue),
            "canceled" => Ok(Self::Canceled),
            "unpaid" => Ok(Self::Unpaid),
            other => Err(format!("unknown subscription status: {other}")),
        }
    }
}

/// A customer's subscription to a recurring product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub recurring_interval: Option<String>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub product: Product,
}

impl Entity for Subscription {
    const KIND: ResourceKind = ResourceKind::Subscriptions;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.product.organization_id
    }
}

/// Filters accepted by the subscription list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSubscriptionsParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListSubscriptionsParams {
    /// Filter parameters as they appear in the list query key.
    pub fn to_query_params(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("status", self.status.map(SubscriptionStatus::as_str))
            .with_opt("productId", self.product_id.clone())
            .with_opt("customerId", self.customer_id.clone())
            .with_opt("page", self.page)
            .with_opt("limit", self.limit)
    }

    /// Filter parameters as HTTP query pairs.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(ref product_id) = self.product_id {
            pairs.push(("product_id", product_id.clone()));
        }
        if let Some(ref customer_id) = self.customer_id {
            pairs.push(("customer_id", customer_id.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Reason a customer gave when a subscription was canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    CustomerService,
    LowQuality,
    MissingFeatures,
    SwitchedService,
    TooComplex,
    TooExpensive,
    Unused,
    Other,
}

impl FromStr for CancellationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "customer_service" => Ok(Self::CustomerService),
            "low_quality" => Ok(Self::LowQuality),
            "missing_features" => Ok(Self::MissingFeatures),
            "switched_service" => Ok(Self::SwitchedService),
            "too_complex" => Ok(Self::TooComplex),
            "too_expensive" => Ok(Self::TooExpensive),
            "unused" => Ok(Self::Unused),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown cancellation reason: {other}")),
        }
    }
}

/// Body of `PATCH /v1/subscriptions/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionUpdate {
    /// Move the subscription to another product.
    Product { product_id: String },
    /// Revoke access immediately.
    Revoke {
        revoke: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_cancellation_reason: Option<CancellationReason>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_cancellation_comment: Option<String>,
    },
    /// Cancel at period end, or undo a pending cancellation.
    Cancel {
        cancel_at_period_end: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_cancellation_reason: Option<CancellationReason>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_cancellation_comment: Option<String>,
    },
}

impl SubscriptionUpdate {
    pub fn change_product(product_id: impl Into<String>) -> Self {
        Self::Product {
            product_id: product_id.into(),
        }
    }

    pub const fn cancel_at_period_end(
        reason: Option<CancellationReason>,
        comment: Option<String>,
    ) -> Self {
        Self::Cancel {
            cancel_at_period_end: true,
            customer_cancellation_reason: reason,
            customer_cancellation_comment: comment,
        }
    }

    /// Undo a pending cancellation.
    pub const fn uncancel() -> Self {
        Self::Cancel {
            cancel_at_period_end: false,
            customer_cancellation_reason: None,
            customer_cancellation_comment: None,
        }
    }

    pub const fn revoke(reason: Option<CancellationReason>, comment: Option<String>) -> Self {
        Self::Revoke {
            revoke: true,
            customer_cancellation_reason: reason,
            customer_cancellation_comment: comment,
        }
    }

    /// Reject payloads the API would refuse anyway.
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            Self::Product { product_id } if product_id.trim().is_empty() => Err(
                DomainError::Validation("product_id cannot be empty".to_string()),
            ),
            Self::Revoke { revoke: false, .. } => Err(DomainError::Validation(
                "revoke update must set revoke to true".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
