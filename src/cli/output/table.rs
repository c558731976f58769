//! Table output formatting for CLI commands
//!
//! Provides formatted table output for subscriptions, orders, products and
//! refunds using comfy-table. Honors `NO_COLOR` and dumb terminals.

use super::{format_amount, truncate};
use crate::domain::models::{Order, OrderStatus, Product, Refund, RefundStatus, Subscription, SubscriptionStatus};
use chrono::{DateTime, Utc};
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    pub fn format_subscriptions(&self, subscriptions: &[Subscription]) -> String {
        let mut table = self.create_base_table();

        table.set_header(header(&["ID", "Product", "Status", "Amount", "Renews", "Customer"]));

        for subscription in subscriptions {
            let status = if subscription.cancel_at_period_end {
                format!("{} (ending)", subscription.status)
            } else {
                subscription.status.to_string()
            };
            let status_cell = if self.use_colors {
                Cell::new(status).fg(subscription_status_color(subscription.status))
            } else {
                Cell::new(status)
            };

            let amount = match (subscription.amount, subscription.currency.as_deref()) {
                (Some(amount), Some(currency)) => {
                    let interval = subscription.recurring_interval.as_deref().unwrap_or("-");
                    format!("{} / {interval}", format_amount(amount, currency))
                }
                _ => "-".to_string(),
            };

            table.add_row(vec![
                Cell::new(&subscription.id),
                Cell::new(truncate(&subscription.product.name, 30)),
                status_cell,
                Cell::new(amount),
                Cell::new(format_date(subscription.current_period_end)),
                Cell::new(subscription.customer_id.as_deref().unwrap_or("-")),
            ]);
        }

        table.to_string()
    }

    pub fn format_products(&self, products: &[Product]) -> String {
        let mut table = self.create_base_table();

        table.set_header(header(&["ID", "Name", "Type", "Archived"]));

        for product in products {
            let kind = if product.is_recurring { "recurring" } else { "one-time" };
            let archived_cell = if product.is_archived && self.use_colors {
                Cell::new("yes").fg(Color::DarkGrey)
            } else {
                Cell::new(if product.is_archived { "yes" } else { "no" })
            };

            table.add_row(vec![
                Cell::new(&product.id),
                Cell::new(truncate(&product.name, 40)),
                Cell::new(kind),
                archived_cell,
            ]);
        }

        table.to_string()
    }

    pub fn format_refunds(&self, refunds: &[Refund]) -> String {
        let mut table = self.create_base_table();

        table.set_header(header(&["ID", "Amount", "Reason", "Status", "Created"]));

        for refund in refunds {
            let status_cell = if self.use_colors {
                Cell::new(refund.status.to_string()).fg(refund_status_color(refund.status))
            } else {
                Cell::new(refund.status.to_string())
            };

            table.add_row(vec![
                Cell::new(&refund.id),
                Cell::new(format_amount(refund.amount, &refund.currency)),
                Cell::new(refund.reason.to_string()),
                status_cell,
                Cell::new(format_date(Some(refund.created_at))),
            ]);
        }

        table.to_string()
    }

    /// Two-column summary of a single order
    pub fn format_order(&self, order: &Order, product: &Product) -> String {
        let mut table = self.create_base_table();

        let status_cell = if self.use_colors {
            Cell::new(order.status.display_name()).fg(order_status_color(order.status))
        } else {
            Cell::new(order.status.display_name())
        };

        let rows = [
            ("Order", Cell::new(&order.id)),
            ("Product", Cell::new(&product.name)),
            ("Status", status_cell),
            ("Billing reason", Cell::new(order.billing_reason_label())),
            ("Created", Cell::new(format_date(Some(order.created_at)))),
            ("Subtotal", Cell::new(format_amount(order.subtotal_amount, &order.currency))),
            ("Discount", Cell::new(format_amount(order.discount_amount, &order.currency))),
            ("Net", Cell::new(format_amount(order.net_amount, &order.currency))),
            ("Tax", Cell::new(format_amount(order.tax_amount, &order.currency))),
            ("Total", Cell::new(format_amount(order.total_amount, &order.currency))),
            ("Refunded", Cell::new(format_amount(order.refunded_amount, &order.currency))),
        ];

        for (label, value) in rows {
            table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), value]);
        }

        table.to_string()
    }

    /// Create a base table with common settings
    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).add_attribute(Attribute::Bold))
        .collect()
}

fn format_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |date| date.format("%Y-%m-%d").to_string())
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

const fn subscription_status_color(status: SubscriptionStatus) -> Color {
    match status {
        SubscriptionStatus::Active | SubscriptionStatus::Trialing => Color::Green,
        SubscriptionStatus::PastDue | SubscriptionStatus::Incomplete => Color::Yellow,
        SubscriptionStatus::Unpaid | SubscriptionStatus::IncompleteExpired => Color::Red,
        SubscriptionStatus::Canceled => Color::DarkGrey,
    }
}

const fn order_status_color(status: OrderStatus) -> Color {
    match status {
        OrderStatus::Paid => Color::Green,
        OrderStatus::Pending => Color::Yellow,
        OrderStatus::PartiallyRefunded => Color::Magenta,
        OrderStatus::Refunded => Color::DarkGrey,
    }
}

const fn refund_status_color(status: RefundStatus) -> Color {
    match status {
        RefundStatus::Succeeded => Color::Green,
        RefundStatus::Pending => Color::Yellow,
        RefundStatus::Failed => Color::Red,
        RefundStatus::Canceled => Color::DarkGrey,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "prod_1".to_string(),
            name: "Pro Plan".to_string(),
            description: None,
            organization_id: "org_1".to_string(),
            is_recurring: true,
            is_archived: false,
            created_at: None,
            modified_at: None,
        }
    }

    #[test]
    fn test_format_products_plain() {
        let formatter = TableFormatter::with_config(false, Some(120));
        let output = formatter.format_products(&[product()]);

        assert!(output.contains("prod_1"));
        assert!(output.contains("Pro Plan"));
        assert!(output.contains("recurring"));
    }

    #[test]
    fn test_format_empty_subscriptions_has_header() {
        let formatter = TableFormatter::with_config(false, None);
        let output = formatter.format_subscriptions(&[]);
        assert!(output.contains("Status"));
    }
}
