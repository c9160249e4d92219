//! Rocket Shoes CLI - Inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cli show
//!
//! # Add one unit of product 1
//! rs-cli add 1
//!
//! # Set product 1 to three units
//! rs-cli update 1 3
//!
//! # Remove product 1
//! rs-cli remove 1
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart and its total
//! - `add` - Add one unit of a product
//! - `remove` - Remove a product
//! - `update` - Set a product's amount (checked against stock)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocket_shoes_cart::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(author, version, about = "Rocket Shoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the amount of a product
    Update {
        /// Product ID
        id: ProductId,

        /// Target amount (zero or less is ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_shoes_cart=info,rs_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::cart::CommandError> {
    let store = commands::cart::open_store()?;

    match cli.command {
        Commands::Show => commands::cart::show(&store),
        Commands::Add { id } => commands::cart::add(&store, id).await?,
        Commands::Remove { id } => commands::cart::remove(&store, id)?,
        Commands::Update { id, amount } => commands::cart::update(&store, id, amount).await?,
    }
    Ok(())
}
