//! Yarn CLI - order id and order lookup tools.
//!
//! # Usage
//!
//! ```bash
//! # Validate an order id
//! yarn-cli order-id validate YARN-AB12CD34
//!
//! # Generate collision-checked order ids
//! yarn-cli order-id generate --count 5
//!
//! # Print an order as JSON
//! yarn-cli order show YARN-AB12CD34
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "yarn-cli")]
#[command(author, version, about = "Yarn Uniforms CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Order id tools
    OrderId {
        #[command(subcommand)]
        action: OrderIdAction,
    },
    /// Order lookup
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum OrderIdAction {
    /// Check whether an id is a well-formed order id
    Validate {
        /// The id to check
        id: String,
    },
    /// Generate order ids checked against the order store
    Generate {
        /// How many ids to generate
        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Print an order as JSON
    Show {
        /// Public order id (YARN-XXXXXXXX)
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::OrderId { action } => match action {
            OrderIdAction::Validate { id } => {
                let order_id = commands::order_id::validate(&id)?;
                println!("{order_id} is a valid order id");
            }
            OrderIdAction::Generate { count } => {
                for order_id in commands::order_id::generate(count).await? {
                    println!("{order_id}");
                }
            }
        },
        Commands::Order { action } => match action {
            OrderAction::Show { id } => {
                let order = commands::order::show(&id).await?;
                println!("{}", serde_json::to_string_pretty(&order)?);
            }
        },
    }
    Ok(())
}
