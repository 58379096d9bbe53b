//! Renewly CLI - operational tools for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Push the sample catalog into the hosted search index
//! rn-cli seed
//!
//! # Validate configuration and probe each hosted collaborator
//! rn-cli check
//!
//! # Inspect a quote export file
//! rn-cli quote list -f quotes.json
//! rn-cli quote show -f quotes.json -i Q-AB12CD
//! ```
//!
//! # Commands
//!
//! - `seed` - Seed the products index from the sample catalog
//! - `check` - Report configured services and probe reachability
//! - `quote` - Inspect exported quote books offline

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rn-cli")]
#[command(author, version, about = "Renewly CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the hosted search index with the sample catalog
    Seed,
    /// Validate configuration and probe hosted services
    Check,
    /// Inspect an exported quote book
    Quote {
        #[command(subcommand)]
        action: QuoteAction,
    },
}

#[derive(Subcommand)]
enum QuoteAction {
    /// List quotes in an export file
    List {
        /// Path to the quote export (JSON)
        #[arg(short, long)]
        file: String,
    },
    /// Show one quote with derived totals
    Show {
        /// Path to the quote export (JSON)
        #[arg(short, long)]
        file: String,

        /// Quote id (e.g. Q-AB12CD)
        #[arg(short, long)]
        id: String,
    },
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Check => commands::check::run().await?,
        Commands::Quote { action } => match action {
            QuoteAction::List { file } => commands::quote::list(&file)?,
            QuoteAction::Show { file, id } => commands::quote::show(&file, &id)?,
        },
    }
    Ok(())
}
