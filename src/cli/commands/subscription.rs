//! Subscription CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{
    CancellationReason, ListResource, ListSubscriptionsParams, Pagination, Subscription,
    SubscriptionStatus, SubscriptionUpdate,
};
use crate::domain::ports::CommerceApi;
use crate::services::QueryClient;

#[derive(Args, Debug)]
pub struct SubscriptionArgs {
    #[command(subcommand)]
    pub command: SubscriptionCommands,
}

#[derive(Subcommand, Debug)]
pub enum SubscriptionCommands {
    /// List an organization's subscriptions
    List {
        /// Organization ID
        #[arg(long = "org")]
        organization_id: String,
        /// Filter by status (active, trialing, past_due, canceled, ...)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by product ID
        #[arg(long)]
        product: Option<String>,
        /// Page number
        #[arg(long)]
        page: Option<u32>,
        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show a subscription
    Get {
        /// Subscription ID
        id: String,
    },
    /// Cancel a subscription at period end, or revoke it now
    Cancel {
        /// Subscription ID
        id: String,
        /// Revoke access immediately instead of at period end
        #[arg(long)]
        immediately: bool,
        /// Cancellation reason (too_expensive, unused, missing_features, ...)
        #[arg(short, long)]
        reason: Option<String>,
        /// Free-form cancellation comment
        #[arg(long)]
        comment: Option<String>,
    },
    /// Undo a pending cancellation
    Uncancel {
        /// Subscription ID
        id: String,
    },
    /// Move a subscription to another product
    ChangeProduct {
        /// Subscription ID
        id: String,
        /// Target product ID
        #[arg(short, long)]
        product: String,
    },
}

#[derive(Debug, Serialize)]
pub struct SubscriptionListOutput {
    pub subscriptions: Vec<Subscription>,
    pub pagination: Pagination,
}

impl From<ListResource<Subscription>> for SubscriptionListOutput {
    fn from(list: ListResource<Subscription>) -> Self {
        Self {
            subscriptions: list.items,
            pagination: list.pagination,
        }
    }
}

impl CommandOutput for SubscriptionListOutput {
    fn to_human(&self) -> String {
        if self.subscriptions.is_empty() {
            return "No subscriptions found.".to_string();
        }

        format!(
            "{}\nShowing {} of {} subscription(s), {} page(s)",
            TableFormatter::new().format_subscriptions(&self.subscriptions),
            self.subscriptions.len(),
            self.pagination.total_count,
            self.pagination.max_page
        )
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionActionOutput {
    pub success: bool,
    pub message: String,
    pub subscription: Subscription,
}

impl CommandOutput for SubscriptionActionOutput {
    fn to_human(&self) -> String {
        format!(
            "{}\n{}",
            self.message,
            TableFormatter::new().format_subscriptions(std::slice::from_ref(&self.subscription))
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct SubscriptionOutput(pub Subscription);

impl CommandOutput for SubscriptionOutput {
    fn to_human(&self) -> String {
        TableFormatter::new().format_subscriptions(std::slice::from_ref(&self.0))
    }
}

pub async fn execute<A: CommerceApi + 'static>(
    args: SubscriptionArgs,
    client: &QueryClient<A>,
    json_mode: bool,
) -> Result<()> {
    let service = &client.subscriptions;

    match args.command {
        SubscriptionCommands::List {
            organization_id,
            status,
            product,
            page,
            limit,
        } => {
            let status = status
                .map(|s| s.parse::<SubscriptionStatus>())
                .transpose()
                .map_err(anyhow::Error::msg)?;
            let params = ListSubscriptionsParams {
                status,
                product_id: product,
                page,
                limit,
                ..ListSubscriptionsParams::default()
            };

            let list = service
                .list(&organization_id, &params)
                .await
                .with_context(|| format!("Failed to list subscriptions of {organization_id}"))?;
            output(&SubscriptionListOutput::from(list), json_mode);
        }

        SubscriptionCommands::Get { id } => {
            let subscription = service
                .get(&id)
                .await
                .with_context(|| format!("Failed to fetch subscription {id}"))?;
            output(&SubscriptionOutput(subscription), json_mode);
        }

        SubscriptionCommands::Cancel {
            id,
            immediately,
            reason,
            comment,
        } => {
            let reason = reason
                .map(|r| r.parse::<CancellationReason>())
                .transpose()
                .map_err(anyhow::Error::msg)?;
            let update = if immediately {
                SubscriptionUpdate::revoke(reason, comment)
            } else {
                SubscriptionUpdate::cancel_at_period_end(reason, comment)
            };

            let subscription = service
                .update(&id, update)
                .await
                .with_context(|| format!("Failed to cancel subscription {id}"))?;
            let message = if immediately {
                format!("Subscription revoked: {id}")
            } else {
                format!("Subscription will cancel at period end: {id}")
            };
            output(
                &SubscriptionActionOutput {
                    success: true,
                    message,
                    subscription,
                },
                json_mode,
            );
        }

        SubscriptionCommands::Uncancel { id } => {
            let subscription = service
                .update(&id, SubscriptionUpdate::uncancel())
                .await
                .with_context(|| format!("Failed to uncancel subscription {id}"))?;
            output(
                &SubscriptionActionOutput {
                    success: true,
                    message: format!("Subscription cancellation undone: {id}"),
                    subscription,
                },
                json_mode,
            );
        }

        SubscriptionCommands::ChangeProduct { id, product } => {
            let subscription = service
                .update(&id, SubscriptionUpdate::change_product(&product))
                .await
                .with_context(|| format!("Failed to change product of subscription {id}"))?;
            output(
                &SubscriptionActionOutput {
                    success: true,
                    message: format!("Subscription {id} moved to product {product}"),
                    subscription,
                },
                json_mode,
            );
        }
    }

    Ok(())
}
