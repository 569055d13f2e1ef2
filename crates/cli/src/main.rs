//! Star Burger CLI - Database migrations and geocoding backfills.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sb-cli migrate
//!
//! # Locate restaurants missing coordinates
//! sb-cli geocode restaurants
//!
//! # Locate delivery addresses of pending orders
//! sb-cli geocode orders
//!
//! # Both of the above
//! sb-cli geocode all
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `geocode` - Fill the coordinate cache and restaurant locations

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(author, version, about = "Star Burger CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Geocode addresses the dashboard needs
    Geocode {
        #[command(subcommand)]
        target: GeocodeTarget,
    },
}

#[derive(Subcommand)]
enum GeocodeTarget {
    /// Locate restaurant addresses
    Restaurants {
        /// Re-locate restaurants that already have coordinates
        #[arg(long)]
        all: bool,
    },
    /// Locate delivery addresses of pending orders
    Orders,
    /// Locate missing restaurants and pending order addresses
    All,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Geocode { target } => {
            let cache = commands::geocode::connect().await?;
            match target {
                GeocodeTarget::Restaurants { all } => {
                    commands::geocode::restaurants(&cache, all).await?;
                }
                GeocodeTarget::Orders => {
                    commands::geocode::orders(&cache).await?;
                }
                GeocodeTarget::All => {
                    commands::geocode::restaurants(&cache, false).await?;
                    commands::geocode::orders(&cache).await?;
                }
            }
        }
    }
    Ok(())
}
