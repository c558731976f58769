//! Order CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{format_amount, output, CommandOutput, TableFormatter};
use crate::domain::models::{Refund, RefundCreate, RefundReason};
use crate::domain::ports::CommerceApi;
use crate::services::{OrderDetail, QueryClient};

#[derive(Args, Debug)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommands,
}

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// Show an order with its product and refunds
    Get {
        /// Order ID
        id: String,
    },
    /// Refund part or all of an order
    Refund {
        /// Order ID
        id: String,
        /// Amount in minor units (cents)
        #[arg(short, long)]
        amount: i64,
        /// Reason (duplicate, fraudulent, customer_request, service_disruption, satisfaction_guarantee, other)
        #[arg(short, long)]
        reason: String,
        /// Internal comment
        #[arg(long)]
        comment: Option<String>,
        /// Revoke the benefits granted by the order
        #[arg(long)]
        revoke_benefits: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct OrderDetailOutput {
    #[serde(flatten)]
    pub detail: OrderDetail,
    pub can_refund: bool,
}

impl CommandOutput for OrderDetailOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let order = &self.detail.order;
        let mut lines = vec![formatter.format_order(order, &self.detail.product)];

        if self.detail.refunds.is_empty() {
            lines.push("No refunds.".to_string());
        } else {
            lines.push(format!("\nRefunds ({}):", self.detail.refunds.pagination.total_count));
            lines.push(formatter.format_refunds(&self.detail.refunds.items));
        }

        if self.can_refund {
            lines.push(format!(
                "Refundable: {}",
                format_amount(order.refundable_amount(), &order.currency)
            ));
        }

        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct RefundActionOutput {
    pub success: bool,
    pub message: String,
    pub refund: Refund,
}

impl CommandOutput for RefundActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute<A: CommerceApi + 'static>(
    args: OrderArgs,
    client: &QueryClient<A>,
    json_mode: bool,
) -> Result<()> {
    let service = &client.orders;

    match args.command {
        OrderCommands::Get { id } => {
            let detail = service
                .detail(&id)
                .await
                .with_context(|| format!("Failed to load order {id}"))?;
            let out = OrderDetailOutput {
                can_refund: detail.can_refund(),
                detail,
            };
            output(&out, json_mode);
        }

        OrderCommands::Refund {
            id,
            amount,
            reason,
            comment,
            revoke_benefits,
        } => {
            let reason = reason.parse::<RefundReason>().map_err(anyhow::Error::msg)?;

            // Load the order first so refund limits are checked locally
            service
                .get(&id)
                .await
                .with_context(|| format!("Failed to load order {id}"))?;

            let refund = service
                .create_refund(RefundCreate {
                    order_id: id.clone(),
                    reason,
                    amount,
                    comment,
                    revoke_benefits,
                })
                .await
                .with_context(|| format!("Failed to refund order {id}"))?;

            let out = RefundActionOutput {
                success: true,
                message: format!(
                    "Refund {} created for order {id}: {}",
                    refund.id,
                    format_amount(refund.amount, &refund.currency)
                ),
                refund,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
