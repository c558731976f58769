//! Product CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::Product;
use crate::domain::ports::CommerceApi;
use crate::services::QueryClient;

#[derive(Args, Debug)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// Show a product
    Get {
        /// Product ID
        id: String,
    },
    /// List an organization's products
    List {
        /// Organization ID
        #[arg(long = "org")]
        organization_id: String,
        /// Include archived products
        #[arg(long)]
        archived: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct ProductListOutput {
    pub products: Vec<Product>,
    pub total: usize,
}

impl CommandOutput for ProductListOutput {
    fn to_human(&self) -> String {
        if self.products.is_empty() {
            return "No products found.".to_string();
        }

        format!(
            "Found {} product(s):\n{}",
            self.total,
            TableFormatter::new().format_products(&self.products)
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ProductOutput(pub Product);

impl CommandOutput for ProductOutput {
    fn to_human(&self) -> String {
        let mut out = TableFormatter::new().format_products(std::slice::from_ref(&self.0));
        if let Some(description) = self.0.description.as_deref() {
            out.push('\n');
            out.push_str(description);
        }
        out
    }
}

pub async fn execute<A: CommerceApi + 'static>(
    args: ProductArgs,
    client: &QueryClient<A>,
    json_mode: bool,
) -> Result<()> {
    match args.command {
        ProductCommands::Get { id } => {
            let product = client
                .products
                .get(&id)
                .await
                .with_context(|| format!("Failed to fetch product {id}"))?;
            output(&ProductOutput(product), json_mode);
        }

        ProductCommands::List {
            organization_id,
            archived,
        } => {
            let list = client
                .products
                .list(&organization_id)
                .await
                .with_context(|| format!("Failed to list products of {organization_id}"))?;
            let products: Vec<Product> = list
                .items
                .into_iter()
                .filter(|product| archived || !product.is_archived)
                .collect();
            let out = ProductListOutput {
                total: products.len(),
                products,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
