//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::order::OrderArgs;
use super::commands::product::ProductArgs;
use super::commands::subscription::SubscriptionArgs;

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Storefront - commerce dashboard data layer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .storefront/config.yaml)
    #[arg(short, long, global = true, env = "STOREFRONT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subscription queries and mutations
    #[command(alias = "subs")]
    Subscriptions(SubscriptionArgs),

    /// Order details and refunds
    Orders(OrderArgs),

    /// Product queries
    Products(ProductArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::subscription::SubscriptionCommands;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "storefront",
            "subscriptions",
            "get",
            "sub_1",
            "--json",
            "--config",
            "custom.yaml",
        ])
        .expect("arguments parse");

        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        match cli.command {
            Commands::Subscriptions(args) => {
                assert!(matches!(args.command, SubscriptionCommands::Get { ref id } if id == "sub_1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cancel_requires_id() {
        let result = Cli::try_parse_from(["storefront", "subscriptions", "cancel"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_refund() {
        let cli = Cli::try_parse_from([
            "storefront",
            "orders",
            "refund",
            "ord_1",
            "--amount",
            "500",
            "--reason",
            "customer_request",
            "--revoke-benefits",
        ])
        .expect("arguments parse");
        assert!(matches!(cli.command, Commands::Orders(_)));
    }
}
