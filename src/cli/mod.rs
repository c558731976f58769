//! Command-line interface
//!
//! Each command builds its request, calls into the query services, and
//! renders the result as a table or as JSON with `--json`.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use crate::domain::ports::CommerceApi;
use crate::services::QueryClient;

/// Run a parsed command against the given client
pub async fn dispatch<A: CommerceApi + 'static>(
    command: Commands,
    client: &QueryClient<A>,
    json_mode: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Subscriptions(args) => commands::subscription::execute(args, client, json_mode).await,
        Commands::Orders(args) => commands::order::execute(args, client, json_mode).await,
        Commands::Products(args) => commands::product::execute(args, client, json_mode).await,
    }
}

/// Print an error and exit with a non-zero status
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": chain.get(1..).unwrap_or_default(),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
